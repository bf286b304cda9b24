use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::security::InputValidator;

pub const APP_DIR_NAME: &str = "imgur-photo-uploader";
pub const DEFAULT_ENDPOINT: &str = "https://api.imgur.com/3/image";
pub const DEFAULT_HISTORY_FILE: &str = "uploads.json";

/// Client id compiled into the binary. Set `IMGUR_CLIENT_ID` when building.
pub const BUILD_CLIENT_ID: Option<&str> = option_env!("IMGUR_CLIENT_ID");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client_id: String,
    pub endpoint: String,
    pub history_file: String,
    pub data_dir: Option<PathBuf>,
    pub jpeg_quality: u8,
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: BUILD_CLIENT_ID.unwrap_or_default().to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            history_file: DEFAULT_HISTORY_FILE.to_string(),
            data_dir: None,
            jpeg_quality: 90,
            request_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Full path of the history file, honouring a `data_dir` override.
    pub fn history_path(&self) -> AppResult<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => get_data_directory()?,
        };
        Ok(dir.join(&self.history_file))
    }
}

pub fn get_config_path() -> AppResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
        .join(APP_DIR_NAME);

    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("config.json"))
}

pub fn get_data_directory() -> AppResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Config("Could not find data directory".to_string()))?
        .join(APP_DIR_NAME);

    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

pub fn load_config() -> AppResult<Config> {
    load_config_from(&get_config_path()?)
}

/// Reads the config at `path`. A missing file is created with defaults; an
/// unparsable one yields defaults with a warning. The result is always validated.
pub fn load_config_from(path: &Path) -> AppResult<Config> {
    let config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        serde_json::from_str(&config_str).unwrap_or_else(|e| {
            log::warn!("Failed to parse config file: {}. Using defaults.", e);
            Config::default()
        })
    } else {
        // First run: write the defaults so there is a file to edit.
        let default_config = Config::default();
        if let Err(e) = save_config_to(&default_config, path) {
            log::warn!("Failed to write default config to {}: {}", path.display(), e);
        }
        default_config
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn save_config_to(config: &Config, path: &Path) -> AppResult<()> {
    validate_config(config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(path, config_str)?;

    log::info!("Configuration saved to {}", path.display());
    Ok(())
}

pub fn validate_config(config: &Config) -> AppResult<()> {
    // An empty client id is allowed here; only uploading needs one.
    if !config.client_id.is_empty() {
        InputValidator::validate_client_id(&config.client_id)?;
    }

    if config.endpoint.trim().is_empty() {
        return Err(AppError::validation("endpoint", "Must not be empty"));
    }

    if config.history_file.trim().is_empty() {
        return Err(AppError::validation("history_file", "Must not be empty"));
    }

    if config.jpeg_quality == 0 || config.jpeg_quality > 100 {
        return Err(AppError::validation("jpeg_quality", "Must be between 1 and 100"));
    }

    if config.request_timeout_secs == Some(0) {
        return Err(AppError::validation(
            "request_timeout_secs",
            "Must be greater than 0 when set",
        ));
    }

    let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
    if !valid_log_levels.contains(&config.log_level.as_str()) {
        return Err(AppError::validation("log_level", "Must be a valid log level"));
    }

    Ok(())
}
