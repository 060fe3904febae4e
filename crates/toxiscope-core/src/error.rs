//! Error types for Toxiscope.
//!
//! Two layers exist. [`BackendError`] is what a collaborator (HTTP client,
//! fake, local store) reports. [`ClientError`] is the four-way taxonomy that
//! every view-facing operation returns, so the caller can pick between an
//! inline banner, a login prompt or a disabled button.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by an external collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendError {
    /// The backend answered 401; the global auth-failure policy has already run.
    #[error("Authentication required")]
    Unauthorized,

    /// Non-success HTTP status with the backend's own message.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Transport failure (DNS, connection refused, TLS, ...)
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// Response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Scoped lookup or delete matched nothing.
    #[error("Record not found")]
    NotFound,
}

impl BackendError {
    /// Creates a Status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Tagged outcome of a view-facing operation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientError {
    /// Bad local input; no network call was made.
    #[error("{0}")]
    Validation(String),

    /// The operation needs a live session and there is none.
    #[error("Please log in to continue")]
    Unauthenticated,

    /// Sign-in, sign-up, sign-out or password change rejected by the auth service.
    #[error("{0}")]
    Auth(String),

    /// Any other backend or network failure; the reason is passed through.
    #[error("{0}")]
    Failed(String),
}

impl ClientError {
    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Failed error
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Maps an auth-service failure: the backend's rejection becomes [`ClientError::Auth`],
    /// while transport problems stay [`ClientError::Failed`].
    pub fn from_auth_backend(err: BackendError) -> Self {
        match err {
            BackendError::Status { message, .. } => Self::Auth(message),
            BackendError::Unauthorized => Self::Auth("Invalid email or password".to_string()),
            other => other.into(),
        }
    }
}

impl From<BackendError> for ClientError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized => Self::Unauthenticated,
            BackendError::Timeout => Self::Failed("request timed out".to_string()),
            BackendError::Status { message, .. } => Self::Failed(message),
            other => Self::Failed(other.to_string()),
        }
    }
}

/// A type alias for `Result<T, ClientError>`.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
