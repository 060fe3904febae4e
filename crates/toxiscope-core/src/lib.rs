//! Domain layer for Toxiscope.
//!
//! Holds the identity and session model, analysis and history records, the
//! pure projections the views compute over them, and the traits for every
//! external collaborator (auth service, record store, inference endpoint,
//! local state). Nothing in this crate performs I/O.

pub mod admin;
pub mod analysis;
pub mod config;
pub mod error;
pub mod history;
pub mod local_state;
pub mod route;
pub mod session;

pub use error::{BackendError, ClientError, ClientResult};
