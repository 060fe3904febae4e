use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_DATA_URL: &str = "http://localhost:54321";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Endpoints and network settings for the client.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST backend hosting `/analyze` and `/admin/*`.
    pub api_url: String,
    /// Base URL of the hosted auth/data service.
    pub data_url: String,
    /// Public (anon) key sent as `apikey` to the hosted service.
    pub anon_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            anon_key: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
