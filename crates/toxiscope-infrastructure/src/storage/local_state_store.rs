//! TOML-backed local state: theme, cached identity and session tokens.

use super::atomic_toml::{AtomicTomlFile, StorageError};
use crate::paths::ToxiscopePaths;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use toxiscope_core::local_state::{LocalState, PreferenceStore, TokenStore};
use toxiscope_core::session::{Identity, SessionTokens};

/// Local state file with an in-memory cache.
///
/// The cache is filled lazily on first read and refreshed on every write, so
/// the transport can read the bearer token per request without touching disk.
#[derive(Clone)]
pub struct TomlLocalStateStore {
    cache: Arc<RwLock<Option<LocalState>>>,
    file: Arc<AtomicTomlFile<LocalState>>,
}

impl TomlLocalStateStore {
    pub fn new(paths: &ToxiscopePaths) -> Result<Self, StorageError> {
        let path = paths
            .state_file()
            .map_err(|e| StorageError::Path(e.to_string()))?;
        Ok(Self::at(path))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            cache: Arc::new(RwLock::new(None)),
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    fn load_state(&self) -> LocalState {
        if let Ok(read_lock) = self.cache.read() {
            if let Some(cached) = read_lock.as_ref() {
                return cached.clone();
            }
        }

        let loaded = match self.file.load() {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(path = %self.file.path().display(), "Ignoring unreadable local state: {}", e);
                LocalState::default()
            }
        };

        if let Ok(mut write_lock) = self.cache.write() {
            *write_lock = Some(loaded.clone());
        }
        loaded
    }

    fn update_state<F>(&self, f: F) -> Result<(), String>
    where
        F: FnOnce(&mut LocalState),
    {
        let updated = self
            .file
            .update(LocalState::default(), f)
            .map_err(|e| format!("Failed to save local state: {}", e))?;

        if let Ok(mut write_lock) = self.cache.write() {
            *write_lock = Some(updated);
        }
        Ok(())
    }
}

impl TokenStore for TomlLocalStateStore {
    fn load_tokens(&self) -> Option<SessionTokens> {
        self.load_state().tokens
    }

    fn save_tokens(&self, tokens: &SessionTokens) -> Result<(), String> {
        let tokens = tokens.clone();
        self.update_state(move |state| state.tokens = Some(tokens))
    }

    fn clear_tokens(&self) -> Result<(), String> {
        if self.load_state().tokens.is_none() {
            return Ok(());
        }
        self.update_state(|state| state.tokens = None)
    }
}

impl PreferenceStore for TomlLocalStateStore {
    fn dark_mode(&self) -> bool {
        self.load_state().dark_mode
    }

    fn set_dark_mode(&self, enabled: bool) -> Result<(), String> {
        self.update_state(|state| state.dark_mode = enabled)
    }

    fn cached_identity(&self) -> Option<Identity> {
        self.load_state().cached_identity
    }

    fn set_cached_identity(&self, identity: Option<&Identity>) -> Result<(), String> {
        let identity = identity.cloned();
        self.update_state(move |state| state.cached_identity = identity)
    }
}
