use std::{env, path::PathBuf, time::Duration};

use url::Url;

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, ListConfig, LoggingConfig, DEFAULT_LIST_URL,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get("GUARDIAN_LIST_URL").unwrap_or_else(|| DEFAULT_LIST_URL.to_string());
        let remote_url = Url::parse(&raw_url).map_err(|err| ConfigError::Invalid {
            key: "GUARDIAN_LIST_URL",
            value: raw_url.clone(),
            reason: err.to_string(),
        })?;

        let interval_hours = parse_u64(&get, "GUARDIAN_UPDATE_INTERVAL_HOURS", 24)?;
        let interval_secs = interval_hours
            .checked_mul(60 * 60)
            .ok_or_else(|| ConfigError::Invalid {
                key: "GUARDIAN_UPDATE_INTERVAL_HOURS",
                value: interval_hours.to_string(),
                reason: "interval is too large".to_string(),
            })?;
        let timeout_ms = parse_u64(&get, "GUARDIAN_FETCH_TIMEOUT_MS", 10_000)?;

        let lists = ListConfig {
            remote_url,
            update_interval: Duration::from_secs(interval_secs),
            fetch_timeout: Duration::from_millis(timeout_ms),
            bundled_path: get("GUARDIAN_BUNDLED_LIST").map(PathBuf::from),
        };

        let directories = DirectoryConfig {
            logs_dir: get("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
            data_dir: get("DATA_DIR").unwrap_or_else(|| "data".to_string()),
            db_filename: get("DB_FILENAME").unwrap_or_else(|| "guardian.db".to_string()),
        };

        let logging = LoggingConfig {
            level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            lists,
            directories,
            logging,
        })
    }
}

fn parse_u64<F>(get: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|err| ConfigError::Invalid {
                key,
                value,
                reason: err.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.lists.remote_url.as_str(), DEFAULT_LIST_URL);
        assert_eq!(config.lists.update_interval, Duration::from_secs(86_400));
        assert_eq!(config.lists.fetch_timeout, Duration::from_secs(10));
        assert!(config.lists.bundled_path.is_none());
        assert_eq!(config.directories.db_filename, "guardian.db");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GUARDIAN_LIST_URL", "http://127.0.0.1:9000/list.json"),
            ("GUARDIAN_UPDATE_INTERVAL_HOURS", "6"),
            ("GUARDIAN_FETCH_TIMEOUT_MS", "2500"),
            ("GUARDIAN_BUNDLED_LIST", "/opt/guardian/websites.json"),
            ("LOG_LEVEL", "debug"),
            ("DATA_DIR", ""),
        ])
        .unwrap();
        assert_eq!(config.lists.remote_url.port(), Some(9000));
        assert_eq!(config.lists.update_interval, Duration::from_secs(6 * 3600));
        assert_eq!(config.lists.fetch_timeout, Duration::from_millis(2500));
        assert_eq!(
            config.lists.bundled_path,
            Some(PathBuf::from("/opt/guardian/websites.json"))
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.directories.data_dir, "data");
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("GUARDIAN_UPDATE_INTERVAL_HOURS", "daily")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "GUARDIAN_UPDATE_INTERVAL_HOURS",
                ..
            }
        ));

        let err = config_from(&[("GUARDIAN_LIST_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "GUARDIAN_LIST_URL", .. }));
    }

    #[test]
    fn test_interval_overflow_is_rejected() {
        let hours = u64::MAX.to_string();
        let err = config_from(&[("GUARDIAN_UPDATE_INTERVAL_HOURS", hours.as_str())]).unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, "GUARDIAN_UPDATE_INTERVAL_HOURS");
                assert_eq!(value, hours);
            }
        }
    }
}
