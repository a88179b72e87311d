//! specwatch — main application entry point.

use std::path::PathBuf;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Identify shadow, zombie, orphan and active APIs by analyzing observed API
/// traffic against declared OpenAPI specifications.
#[derive(Parser, Debug)]
#[command(name = "specwatch", version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Run in debug mode
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    specwatch::init_tracing(cli.debug);

    let shutdown = install_signal_handler();
    specwatch::app::run(&cli.config, shutdown).await;
}

/// Register for SIGINT and SIGTERM. The returned token is cancelled on the
/// first signal; a second signal terminates the process with exit code 1.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let guard = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("received shutdown signal, cancelling run");
        guard.cancel();

        wait_for_signal().await;
        tracing::error!("received second shutdown signal, terminating");
        std::process::exit(1);
    });

    token
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
