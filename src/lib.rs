use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub mod api;
pub mod clipboard;
pub mod generation;
pub mod library;
pub mod metadata;
pub mod render;
pub mod session;
pub mod setup;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub app: AppConfig,
    pub generation: GenerationDefaults,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Where the image server listens, e.g. `http://192.168.1.20:3000`.
    pub base_url: String,
    /// No timeout is applied unless this is set.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    /// How long the "copied" marker stays up after copying a prompt.
    pub copy_feedback_millis: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationDefaults {
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f32,
    pub sampler_name: String,
    pub seed: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Sikority".to_string(),
            log_level: "info".to_string(),
            copy_feedback_millis: 2000,
        }
    }
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            width: 768,
            height: 1344,
            steps: 20,
            cfg_scale: 7.0,
            sampler_name: "DPM++ 2M Karras".to_string(),
            seed: -1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml_edit::de::Error),
}

impl Config {
    /// Reads a TOML config file, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = toml_edit::de::from_str::<Config>(&content)?;
        info!("Configuration loaded from: {:?}", path);
        Ok(config)
    }
}
