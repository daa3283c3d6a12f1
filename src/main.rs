use clap::Parser;
use shiftsync::cli::Cli;
use shiftsync::config::{self, Config};
use shiftsync::{shutdown, startup};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    // env-backed options must see values that only live in .env
    config::load_env_file(None);
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            return Err(e.into());
        }
    };

    let cancel = CancellationToken::new();
    let listener = shutdown::spawn_signal_listener(cancel.clone());

    // Dropping the command future cancels every request still in flight
    let result = tokio::select! {
        result = startup::run(config, cli.command) => result.map_err(miette::Report::from),
        _ = cancel.cancelled() => {
            info!("Cancelled before completion");
            Ok(())
        }
    };

    cancel.cancel();
    let _ = listener.await;
    result
}
