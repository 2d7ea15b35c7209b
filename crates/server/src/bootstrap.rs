use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;

use stenbot_core::calc::ReservePolicy;
use stenbot_core::catalog::Catalog;
use stenbot_core::config::{AppConfig, ConfigError, LoadOptions};
use stenbot_core::dialogue::DialogueEngine;
use stenbot_telegram::dispatch::{DispatchBridge, DispatchTuning};
use stenbot_telegram::outbound::TelegramApiSender;

pub struct Application {
    pub config: AppConfig,
    pub bridge: DispatchBridge,
    /// Path segment Telegram must present on webhook calls.
    pub webhook_token: String,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(BootstrapError::HttpClient)?;

    let bot_token = config.telegram.bot_token.expose_secret().to_owned();
    let sender = Arc::new(TelegramApiSender::new(
        http,
        config.telegram.api_base_url.clone(),
        bot_token.clone(),
    ));

    let engine = DialogueEngine::new(
        Catalog::builtin(),
        ReservePolicy { factor: config.calculator.reserve_factor },
    );
    let tuning = DispatchTuning {
        queue_capacity: config.dispatch.queue_capacity,
        idle_timeout: Duration::from_secs(config.dispatch.idle_timeout_secs),
        admin_conversation_id: config.telegram.admin_conversation_id,
    };
    let bridge = DispatchBridge::new(engine, sender, tuning);

    info!(
        event_name = "system.bootstrap.ready",
        queue_capacity = config.dispatch.queue_capacity,
        idle_timeout_secs = config.dispatch.idle_timeout_secs,
        admin_configured = config.telegram.admin_conversation_id.is_some(),
        "dispatch bridge initialized"
    );

    Ok(Application { config, bridge, webhook_token: bot_token })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use stenbot_core::config::{ConfigOverrides, LoadOptions};

    use super::{bootstrap, BootstrapError};

    #[tokio::test]
    async fn bootstrap_wires_the_bridge_from_config() {
        let application = bootstrap(LoadOptions {
            config_path: None,
            require_file: false,
            overrides: ConfigOverrides {
                bot_token: Some("123:token".to_owned()),
                ..ConfigOverrides::default()
            },
        })
        .await
        .expect("bootstrap");

        assert_eq!(application.webhook_token, "123:token");
        assert_eq!(application.bridge.active_workers().await, 0);
    }

    #[tokio::test]
    async fn bootstrap_surfaces_config_failures() {
        let result = bootstrap(LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/stenbot.toml")),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .await;

        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }
}
