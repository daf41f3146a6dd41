use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::errors::AppError;
use crate::utils::paths::{self, ensure_dir, write_atomic};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    pub locale: String,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            locale: "pt-BR".into(),
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, AppError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, AppError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
        })
    }

    /// Reads the stored configuration, falling back to defaults when no file
    /// exists yet. `APAJAC_ADMIN_API_URL` overrides the stored base URL.
    pub fn load(&self) -> Result<Config, AppError> {
        let mut config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            Config::default()
        };
        if let Ok(url) = std::env::var("APAJAC_ADMIN_API_URL") {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().to_string();
            }
        }
        validate(&config)?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), AppError> {
        validate(config)?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn validate(config: &Config) -> Result<(), AppError> {
    let url = config.api_base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::Config(format!(
            "api_base_url must be an http(s) URL (got `{}`)",
            config.api_base_url
        )));
    }
    if config.request_timeout_secs == 0 {
        return Err(AppError::Config(
            "request_timeout_secs must be at least 1".into(),
        ));
    }
    Ok(())
}
