use std::io;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Cancel `token` once a termination signal arrives
pub fn spawn_signal_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = wait_for_signal() => match result {
                Ok(()) => token.cancel(),
                Err(e) => error!("Failed to install signal handlers: {}", e),
            },
            _ = token.cancelled() => {}
        }
    })
}

/// Platform-specific signal handling implementation
#[cfg(unix)]
async fn wait_for_signal() -> io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    // Ctrl+C
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, cancelling");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal, cancelling");
        }
    }
    Ok(())
}

/// Platform-specific signal handling implementation
#[cfg(windows)]
async fn wait_for_signal() -> io::Result<()> {
    let mut ctrlc = ctrl_c()?;
    let mut ctrlbreak = ctrl_break()?;

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, cancelling");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, cancelling");
        }
    }
    Ok(())
}
