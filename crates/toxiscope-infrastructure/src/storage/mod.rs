//! Local file storage.

pub mod atomic_toml;
pub mod local_state_store;

pub use atomic_toml::{AtomicTomlFile, StorageError};
pub use local_state_store::TomlLocalStateStore;
