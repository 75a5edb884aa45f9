//! Live views driven by the poller

use anyhow::Result;
use avh_api_contract::Trackable;
use avh_client_api::ClientApiResult;
use avh_core::{Poller, Snapshot};
use std::future::Future;
use std::io::Write;
use std::time::Duration;

/// Poll with `fetch` until every record is terminal or Ctrl-C is pressed,
/// handing each snapshot to `render`.
pub async fn follow<T, F, Fut, R>(
    interval: Duration,
    fetch: F,
    out: &mut dyn Write,
    mut render: R,
) -> Result<()>
where
    T: Trackable + Clone + Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ClientApiResult<Vec<T>>> + Send + 'static,
    R: FnMut(&Snapshot<T>, &mut dyn Write) -> Result<()>,
{
    let mut handle = Poller::new(interval).stop_when_settled(true).spawn(fetch);

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let mut failure = None;
    loop {
        tokio::select! {
            snapshot = handle.next() => {
                let Some(snapshot) = snapshot else { break };
                let shown = match &snapshot.error {
                    Some(error) => writeln!(out, "! refresh failed: {}", error).map_err(Into::into),
                    None => render(&snapshot, out),
                }
                .and_then(|()| out.flush().map_err(Into::into));
                if let Err(err) = shown {
                    handle.cancel();
                    failure = Some(err);
                    break;
                }
            }
            _ = &mut interrupted => {
                tracing::debug!("watch interrupted");
                handle.cancel();
                break;
            }
        }
    }

    handle.join().await;
    failure.map_or(Ok(()), Err)
}
