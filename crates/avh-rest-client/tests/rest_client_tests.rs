//! Exercises the REST client against a canned single-request HTTP server.

use avh_api_contract::{JobStatus, StartTestRunRequest};
use avh_client_api::{ClientApi, ClientApiError};
use avh_rest_client::{AuthMethod, RestClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one request with `status` and `body`, returning the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request_complete(&request) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base_url, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}

#[tokio::test]
async fn test_list_test_runs_decodes_and_settles() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"[
            {"id": "run_2", "dataset_id": "1", "agent_id": "11", "run_type": "e2e",
             "status": "completed", "progress": 80},
            {"id": "run_1", "dataset_id": "2", "agent_id": "12", "run_type": "intent",
             "status": "running", "progress": 35}
        ]"#,
    )
    .await;

    let client = RestClient::from_url(&base_url, AuthMethod::api_key("secret")).unwrap();
    let runs = ClientApi::list_test_runs(&client).await.unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].status, JobStatus::Succeeded);
    assert_eq!(runs[0].progress.percent(), 100);
    assert_eq!(runs[1].progress.percent(), 35);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/tests/runs HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: apikey secret"));
}

#[tokio::test]
async fn test_start_test_run_posts_json_body() {
    let (base_url, server) = serve_once("200 OK", r#"{"id": "run_1700000000000"}"#).await;

    let client = RestClient::from_url(&base_url, AuthMethod::None).unwrap();
    let request = StartTestRunRequest {
        dataset_id: "1".into(),
        agent_id: "11".into(),
    };
    let started = client.start_test_run(&request).await.unwrap();
    assert_eq!(started.id, "run_1700000000000");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/tests/start HTTP/1.1"));
    assert!(raw.contains(r#""dataset_id":"1""#));
    assert!(raw.contains(r#""agent_id":"11""#));
}

#[tokio::test]
async fn test_crawl_jobs_use_fraction_progress() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"[{"id": "cj_1", "source": "guba", "status": "running", "progress": 0.5,
             "stats": {"crawled": 40, "stored": 38, "failed": 2}}]"#,
    )
    .await;

    let client = RestClient::from_url(&base_url, AuthMethod::None).unwrap();
    let jobs = client.list_crawl_jobs().await.unwrap();
    assert_eq!(jobs[0].progress.percent(), 50);
    assert_eq!(jobs[0].stats.as_ref().unwrap().failed(), 2);
    server.await.unwrap();
}

#[tokio::test]
async fn test_server_errors_surface_as_client_errors() {
    let (base_url, server) = serve_once("500 Internal Server Error", "database down").await;

    let client = RestClient::from_url(&base_url, AuthMethod::None).unwrap();
    let err = ClientApi::list_datasets(&client).await.unwrap_err();
    assert!(matches!(err, ClientApiError::Server(ref msg) if msg.contains("database down")));
    server.await.unwrap();
}

#[tokio::test]
async fn test_invalid_start_request_is_rejected_before_sending() {
    let client = RestClient::from_url("http://127.0.0.1:9", AuthMethod::None).unwrap();
    let request = StartTestRunRequest {
        dataset_id: String::new(),
        agent_id: "11".into(),
    };
    let err = ClientApi::start_test_run(&client, &request).await.unwrap_err();
    assert!(matches!(err, ClientApiError::Validation(_)));
}
