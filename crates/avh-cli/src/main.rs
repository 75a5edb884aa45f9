use avh_cli::{Cli, Console, Parser};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing subscriber; views write to stdout, logs go to stderr
    let filter = match cli.global.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let console = match Console::open(&cli.global) {
        Ok(console) => console,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(mock = console.config.is_mock(), "console ready");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command.run(&console, &mut out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
