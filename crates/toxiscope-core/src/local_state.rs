//! Persisted local state outside the remote backends.
//!
//! Everything here is advisory. Only the session store's restore call
//! decides whether a session is valid.

use crate::session::{Identity, SessionTokens};
use serde::{Deserialize, Serialize};

/// On-disk shape of the local state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub cached_identity: Option<Identity>,
    #[serde(default)]
    pub tokens: Option<SessionTokens>,
}

/// Where the transport reads the bearer token from.
pub trait TokenStore: Send + Sync {
    fn load_tokens(&self) -> Option<SessionTokens>;

    fn save_tokens(&self, tokens: &SessionTokens) -> Result<(), String>;

    fn clear_tokens(&self) -> Result<(), String>;
}

/// Theme preference and last known identity.
pub trait PreferenceStore: Send + Sync {
    fn dark_mode(&self) -> bool;

    fn set_dark_mode(&self, enabled: bool) -> Result<(), String>;

    fn cached_identity(&self) -> Option<Identity>;

    fn set_cached_identity(&self, identity: Option<&Identity>) -> Result<(), String>;
}
