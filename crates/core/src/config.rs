use std::env;
use std::fs;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

/// Fully resolved application configuration: defaults, then the optional
/// TOML file, then `STENBOT_*` environment variables, then programmatic
/// overrides, in that order.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub server: ServerConfig,
    pub dispatch: DispatchConfig,
    pub calculator: CalculatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    pub api_base_url: String,
    pub admin_conversation_id: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

/// Tuning for the per-conversation dispatch workers.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    pub queue_capacity: usize,
    pub idle_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CalculatorConfig {
    pub reserve_factor: f64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bot_token: Option<String>,
    pub admin_conversation_id: Option<i64>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub reserve_factor: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("telegram bot token is not configured")]
    MissingBotToken,
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

const DEFAULT_CONFIG_FILE: &str = "stenbot.toml";
const ENV_PREFIX: &str = "STENBOT_";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    telegram: Option<FileTelegram>,
    server: Option<FileServer>,
    dispatch: Option<FileDispatch>,
    calculator: Option<FileCalculator>,
    logging: Option<FileLogging>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileTelegram {
    bot_token: Option<String>,
    api_base_url: Option<String>,
    admin_conversation_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileServer {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileDispatch {
    queue_capacity: Option<usize>,
    idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileCalculator {
    reserve_factor: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let file = load_file(&options)?;

        let telegram_file = file.telegram.unwrap_or_default();
        let server_file = file.server.unwrap_or_default();
        let dispatch_file = file.dispatch.unwrap_or_default();
        let calculator_file = file.calculator.unwrap_or_default();
        let logging_file = file.logging.unwrap_or_default();

        let bot_token = options
            .overrides
            .bot_token
            .or(env_string("BOT_TOKEN"))
            .or(telegram_file.bot_token)
            .ok_or(ConfigError::MissingBotToken)?;
        if bot_token.trim().is_empty() {
            return Err(ConfigError::MissingBotToken);
        }

        let config = Self {
            telegram: TelegramConfig {
                bot_token: SecretString::from(bot_token),
                api_base_url: env_string("API_BASE_URL")
                    .or(telegram_file.api_base_url)
                    .unwrap_or_else(|| "https://api.telegram.org".to_owned()),
                admin_conversation_id: options
                    .overrides
                    .admin_conversation_id
                    .or(env_parsed("ADMIN_CONVERSATION_ID")?)
                    .or(telegram_file.admin_conversation_id),
            },
            server: ServerConfig {
                bind_address: options
                    .overrides
                    .bind_address
                    .or(env_string("BIND_ADDRESS"))
                    .or(server_file.bind_address)
                    .unwrap_or_else(|| "0.0.0.0".to_owned()),
                port: options
                    .overrides
                    .port
                    .or(env_parsed("PORT")?)
                    .or(server_file.port)
                    .unwrap_or(8443),
            },
            dispatch: DispatchConfig {
                queue_capacity: env_parsed("QUEUE_CAPACITY")?
                    .or(dispatch_file.queue_capacity)
                    .unwrap_or(16),
                idle_timeout_secs: env_parsed("IDLE_TIMEOUT_SECS")?
                    .or(dispatch_file.idle_timeout_secs)
                    .unwrap_or(30 * 60),
            },
            calculator: CalculatorConfig {
                reserve_factor: options
                    .overrides
                    .reserve_factor
                    .or(env_parsed("RESERVE_FACTOR")?)
                    .or(calculator_file.reserve_factor)
                    .unwrap_or(1.1),
            },
            logging: LoggingConfig {
                level: options
                    .overrides
                    .log_level
                    .or(env_string("LOG_LEVEL"))
                    .or(logging_file.level)
                    .unwrap_or_else(|| "info".to_owned()),
                format: env_log_format()?.or(logging_file.format).unwrap_or(LogFormat::Compact),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "dispatch.queue_capacity must be at least 1".to_owned(),
            ));
        }
        if self.dispatch.idle_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "dispatch.idle_timeout_secs must be at least 1".to_owned(),
            ));
        }
        if !self.calculator.reserve_factor.is_finite() || self.calculator.reserve_factor < 1.0 {
            return Err(ConfigError::Validation(
                "calculator.reserve_factor must be a finite value >= 1.0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn load_file(options: &LoadOptions) -> Result<FileConfig, ConfigError> {
    let path = match &options.config_path {
        Some(path) => path.clone(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    if !path.exists() {
        if options.require_file || options.config_path.is_some() {
            return Err(ConfigError::MissingConfigFile(path));
        }
        return Ok(FileConfig::default());
    }

    let raw = fs::read_to_string(&path)
        .map_err(|source| ConfigError::ReadFile { path: path.clone(), source })?;
    toml::from_str(&raw).map_err(|source| ConfigError::ParseFile { path, source })
}

fn env_string(key: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{key}")).ok().filter(|value| !value.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    let Some(value) = env_string(key) else {
        return Ok(None);
    };
    value
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnvOverride { key: format!("{ENV_PREFIX}{key}"), value })
}

fn env_log_format() -> Result<Option<LogFormat>, ConfigError> {
    let Some(value) = env_string("LOG_FORMAT") else {
        return Ok(None);
    };
    match value.as_str() {
        "compact" => Ok(Some(LogFormat::Compact)),
        "pretty" => Ok(Some(LogFormat::Pretty)),
        "json" => Ok(Some(LogFormat::Json)),
        _ => Err(ConfigError::InvalidEnvOverride { key: format!("{ENV_PREFIX}LOG_FORMAT"), value }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    fn options_with_token() -> LoadOptions {
        LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/stenbot.toml")),
            require_file: false,
            overrides: ConfigOverrides {
                bot_token: Some("123456:test-token".to_owned()),
                ..ConfigOverrides::default()
            },
        }
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/other.toml")),
            ..LoadOptions::default()
        };
        assert!(matches!(
            AppConfig::load(options),
            Err(ConfigError::MissingConfigFile(_))
        ));
    }

    #[test]
    fn missing_bot_token_is_rejected() {
        let options = LoadOptions { config_path: None, ..LoadOptions::default() };
        assert!(matches!(AppConfig::load(options), Err(ConfigError::MissingBotToken)));
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let mut options = options_with_token();
        options.config_path = None;

        let config = AppConfig::load(options).expect("defaults with token override");

        assert_eq!(config.server.port, 8443);
        assert_eq!(config.dispatch.queue_capacity, 16);
        assert_eq!(config.dispatch.idle_timeout_secs, 1800);
        assert_eq!(config.calculator.reserve_factor, 1.1);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.telegram.bot_token.expose_secret(), "123456:test-token");
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        writeln!(
            file,
            r#"
[telegram]
bot_token = "999:file-token"
admin_conversation_id = 203473623

[server]
port = 9000

[dispatch]
queue_capacity = 4
idle_timeout_secs = 60

[calculator]
reserve_factor = 1.0

[logging]
level = "debug"
format = "json"
"#
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("file config");

        assert_eq!(config.telegram.bot_token.expose_secret(), "999:file-token");
        assert_eq!(config.telegram.admin_conversation_id, Some(203473623));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.dispatch.queue_capacity, 4);
        assert_eq!(config.calculator.reserve_factor, 1.0);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        writeln!(file, "[server]\nport = 9000\n[telegram]\nbot_token = \"999:file\"")
            .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides {
                bot_token: Some("111:override".to_owned()),
                port: Some(9100),
                ..ConfigOverrides::default()
            },
        })
        .expect("file config with overrides");

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.telegram.bot_token.expose_secret(), "111:override");
    }

    #[test]
    fn reserve_factor_below_one_fails_validation() {
        let mut options = options_with_token();
        options.config_path = None;
        options.overrides.reserve_factor = Some(0.9);

        assert!(matches!(
            AppConfig::load(options),
            Err(ConfigError::Validation(message)) if message.contains("reserve_factor")
        ));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        writeln!(file, "[telegram]\nbot_token = \"1:x\"\nwebhook = \"legacy\"")
            .expect("write config");

        let result = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        });

        assert!(matches!(result, Err(ConfigError::ParseFile { .. })));
    }
}
