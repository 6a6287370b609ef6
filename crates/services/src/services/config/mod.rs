use std::path::Path;

use thiserror::Error;

mod schema;

pub use schema::{
    AccessControlConfig, AccessControlMode, CURRENT_CONFIG_VERSION, Config, NotificationConfig,
    SiteConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Reads the config file, falling back to defaults when it is missing or
/// unparseable.
pub async fn load_config_from_file(config_path: &Path) -> Config {
    match tokio::fs::read_to_string(config_path).await {
        Ok(raw) => Config::from_raw(&raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No config file found, creating one");
            Config::default()
        }
        Err(err) => {
            tracing::warn!("Failed to read config file: {}", err);
            Config::default()
        }
    }
}

/// Normalizes and writes the config as pretty-printed JSON.
pub async fn save_config_to_file(config: &Config, config_path: &Path) -> Result<(), ConfigError> {
    let normalized = config.clone().normalized();
    let raw = serde_json::to_string_pretty(&normalized)?;
    tokio::fs::write(config_path, raw).await?;
    Ok(())
}
