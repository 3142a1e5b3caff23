//! Static asset server for the tipping widget.

use std::env;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{info, warn};

use tipsy::api::{AssetConfig, create_router};
use tipsy::logging::init_tracing;

/// Default port when `PORT` is unset or unparsable
const DEFAULT_PORT: u16 = 3000;

/// Server configuration
struct Config {
    host: String,
    port: u16,
    assets: AssetConfig,
}

impl Config {
    fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            host,
            port,
            assets: AssetConfig::from_env(),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env();

    if !config.assets.index_path().is_file() {
        warn!(
            path = %config.assets.index_path().display(),
            "Index page not found; / will return 404"
        );
    }

    let router = create_router(&config.assets);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        "Tipsy v{} is running on port {} (assets: {})",
        env!("CARGO_PKG_VERSION"),
        config.port,
        config.assets.public_dir.display()
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
