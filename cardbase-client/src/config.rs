use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fallback backend address when neither the environment nor the config
/// file names one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment override for the backend base URL. Wins over the config
/// file when set and non-empty.
pub const API_URL_ENV: &str = "CARDBASE_API_URL";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    pub api: Option<ApiSettings>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: Some(ApiSettings {
                base_url: DEFAULT_API_URL.to_string(),
            }),
        }
    }
}

impl ClientConfig {
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            let default_config = r#"
[api]
# Base URL of the extraction backend. The CARDBASE_API_URL environment
# variable takes precedence over this value.
base_url = "http://localhost:8000"
"#;
            std::fs::write(&config_path, default_config).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: ClientConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    /// Resolve the backend base URL: environment override first, then the
    /// config file, then the built-in default. Read once at startup and
    /// never changed afterwards.
    pub fn api_base_url(&self) -> String {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }
        self.api
            .as_ref()
            .map(|api| api.base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("cardbase").join("client.toml")
    } else {
        PathBuf::from("client.toml")
    }
}
