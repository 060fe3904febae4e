pub mod config_service;
pub mod http;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http::{HostedAuthClient, HostedRecordStore, HostedService, HttpTransport, RestAdminClient, RestInferenceClient};
pub use crate::paths::ToxiscopePaths;
pub use crate::storage::TomlLocalStateStore;
