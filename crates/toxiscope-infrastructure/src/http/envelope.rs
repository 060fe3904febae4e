//! The `{success, data, error, message}` envelope used by the REST service.

use serde::Deserialize;
use toxiscope_core::BackendError;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps `data` from a successful envelope.
    ///
    /// A 2xx with `success: false` is treated as a failure carrying `error`.
    pub fn into_result(self) -> Result<T, BackendError> {
        if !self.success {
            let message = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "Request was not successful".to_string());
            return Err(BackendError::status(200, message));
        }
        self.data
            .ok_or_else(|| BackendError::decode("response envelope has no data"))
    }
}
