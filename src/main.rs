use clap::Parser;
use qris_fetch::{Cli, QrisError, Session, output};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if matches!(err, QrisError::Status(_)) {
                eprintln!("HTTP error while fetching transactions.");
                eprintln!("Check that your session cookie and secret headers are fresh.");
            }
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), QrisError> {
    let config = cli.resolve()?;
    let mut session = Session::new(&config)?;
    let payload = session
        .fetch_transactions(config.start_date, config.end_date, config.refresh)
        .await?;
    output::write_json(&payload, config.output.as_deref())
}
