//! Client configuration loading.
//!
//! Priority: environment variables > config.toml > built-in defaults.

use crate::paths::ToxiscopePaths;
use crate::storage::{AtomicTomlFile, StorageError};
use std::path::Path;
use toxiscope_core::config::ClientConfig;

pub const ENV_API_URL: &str = "TOXISCOPE_API_URL";
pub const ENV_DATA_URL: &str = "TOXISCOPE_DATA_URL";
pub const ENV_ANON_KEY: &str = "TOXISCOPE_ANON_KEY";
pub const ENV_TIMEOUT_SECS: &str = "TOXISCOPE_TIMEOUT_SECS";

pub struct ConfigService;

impl ConfigService {
    /// Loads the configuration from `explicit` if given, otherwise from the
    /// default config file, then applies environment overrides.
    pub fn load(paths: &ToxiscopePaths, explicit: Option<&Path>) -> Result<ClientConfig, StorageError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => paths.config_file().map_err(|e| StorageError::Path(e.to_string()))?,
        };

        let from_file = AtomicTomlFile::<ClientConfig>::new(path.clone()).load()?;
        if from_file.is_some() {
            tracing::debug!(path = %path.display(), "Loaded config file");
        }

        let mut config = from_file.unwrap_or_default();
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api_url = url;
    }
    if let Some(url) = lookup(ENV_DATA_URL).filter(|v| !v.trim().is_empty()) {
        config.data_url = url;
    }
    if let Some(key) = lookup(ENV_ANON_KEY).filter(|v| !v.trim().is_empty()) {
        config.anon_key = Some(key);
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.request_timeout_secs = secs,
            Err(_) => tracing::warn!("Ignoring invalid {}: {:?}", ENV_TIMEOUT_SECS, raw),
        }
    }
}
