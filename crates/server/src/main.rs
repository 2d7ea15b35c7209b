mod bootstrap;
mod webhook;

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use stenbot_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use stenbot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

fn load_options() -> LoadOptions {
    // An explicit config path may be passed as the sole argument.
    match env::args().nth(1) {
        Some(path) => LoadOptions {
            config_path: Some(PathBuf::from(path)),
            require_file: true,
            ..LoadOptions::default()
        },
        None => LoadOptions::default(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(load_options())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "stenbot-server listening"
    );

    let router = webhook::router(webhook::AppState {
        bridge: app.bridge.clone(),
        webhook_token: app.webhook_token.clone(),
    });
    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "system.server.stopping", "stenbot-server stopping");
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(
            event_name = "system.server.signal_error",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
}
