//! Unified path management for toxiscope configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/toxiscope/         # Config directory (platform default)
//! ├── config.toml              # Endpoints and timeouts
//! └── state.toml               # Theme, cached identity, session tokens
//! ```
//!
//! A base directory can be injected (tests, or the directory of an explicit
//! `--config` file), in which case the files live directly under it.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "toxiscope";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

#[derive(Debug, Clone, Default)]
pub struct ToxiscopePaths {
    base_dir: Option<PathBuf>,
}

impl ToxiscopePaths {
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    /// Paths rooted beside an explicit config file, or the platform default
    /// when none is given.
    pub fn for_config_file(config_file: Option<&Path>) -> Self {
        let base_dir = config_file.and_then(Path::parent).map(|parent| {
            if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            }
        });
        Self { base_dir }
    }

    /// Returns the toxiscope configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: The injected base directory, or e.g. `~/.config/toxiscope/`
    /// - `Err(PathError::ConfigDirNotFound)`: No base given and no platform directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the local state file.
    ///
    /// # Security Note
    ///
    /// This file holds session tokens; it is written with mode 600 on Unix.
    pub fn state_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("state.toml"))
    }
}
