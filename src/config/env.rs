use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

pub const DEFAULT_LIST_URL: &str =
    "https://raw.githubusercontent.com/farivar-tabatabaei/TheGuardianExt/main/websites.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub lists: ListConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ListConfig {
    pub remote_url: Url,
    pub update_interval: Duration,
    pub fetch_timeout: Duration,
    /// Overrides the embedded default document when set.
    pub bundled_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub data_dir: String,
    pub db_filename: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
