use anyhow::{Context, Result};
use clap::Parser;
use portal_dev_proxy::cli::Cli;
use portal_dev_proxy::ShimServer;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = cli.load_config().context("Failed to load configuration")?;
    debug!("Loaded configuration: {:?}", config);

    let server = ShimServer::new(config)?;

    // No draining: in-flight requests are dropped with the runtime.
    tokio::select! {
        result = server.run() => result,
        signal = shutdown_signal() => {
            info!("Received {}, shutting down proxy server", signal);
            Ok(())
        }
    }
}

/// Logs go to stdout; `RUST_LOG` wins when no `-v` is given.
fn init_tracing(verbose: u8) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", err);
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl-C"
}
