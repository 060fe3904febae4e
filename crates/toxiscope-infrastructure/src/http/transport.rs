//! Shared HTTP transport.
//!
//! Every outgoing call goes through [`HttpTransport`], which plays the role of
//! the request/response interceptor pair:
//!
//! - request side: attach `Authorization: Bearer <token>` when a token is
//!   persisted (or an explicit one is given)
//! - response side: a 401 on a [`UnauthorizedPolicy::Notify`] call invokes the
//!   installed [`UnauthorizedHandler`] once per response, then surfaces as
//!   [`BackendError::Unauthorized`]

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use toxiscope_core::BackendError;
use toxiscope_core::local_state::TokenStore;
use toxiscope_core::session::UnauthorizedHandler;

/// Which token, if any, to attach.
#[derive(Debug, Clone, Copy)]
pub enum Bearer<'a> {
    /// Whatever the token store currently holds.
    Stored,
    Explicit(&'a str),
    None,
}

/// What a 401 on this call means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedPolicy {
    /// A protected call: run the global auth-failure handler.
    Notify,
    /// Session-establishing or session-probing call: just report it.
    Report,
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    tokens: Arc<dyn TokenStore>,
    unauthorized: Arc<OnceLock<Arc<dyn UnauthorizedHandler>>>,
}

impl HttpTransport {
    pub fn new(tokens: Arc<dyn TokenStore>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, tokens))
    }

    pub fn with_client(client: Client, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            tokens,
            unauthorized: Arc::new(OnceLock::new()),
        }
    }

    /// Installs the global 401 handler. Only the first installation wins.
    pub fn install_unauthorized_handler(&self, handler: Arc<dyn UnauthorizedHandler>) {
        if self.unauthorized.set(handler).is_err() {
            tracing::warn!("Unauthorized handler already installed; ignoring replacement");
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Starts a request with the bearer token attached.
    pub fn request(&self, method: Method, url: &str, bearer: Bearer<'_>) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match bearer {
            Bearer::Stored => match self.tokens.load_tokens() {
                Some(tokens) => builder.bearer_auth(tokens.access_token),
                None => builder,
            },
            Bearer::Explicit(token) => builder.bearer_auth(token),
            Bearer::None => builder,
        }
    }

    /// Sends the request and maps every non-success outcome to a [`BackendError`].
    pub async fn execute(&self, builder: RequestBuilder, policy: UnauthorizedPolicy) -> Result<Response, BackendError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(url = %response.url(), ?policy, "Received 401");
            if policy == UnauthorizedPolicy::Notify {
                if let Some(handler) = self.unauthorized.get() {
                    handler.on_unauthorized();
                }
            }
            return Err(BackendError::Unauthorized);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BackendError::status(status.as_u16(), error_message(status, &body)))
    }

    /// Sends and decodes a JSON body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        policy: UnauthorizedPolicy,
    ) -> Result<T, BackendError> {
        let response = self.execute(builder, policy).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::decode(e.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::network(err.to_string())
    }
}

/// Extracts the human-readable message from an error body.
///
/// Understands the REST envelope (`error`), the data service (`message`) and
/// the auth service (`msg`, `error_description`); falls back to the raw body.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                if !message.trim().is_empty() {
                    return message.to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        format!("Request failed with status {}", status.as_u16())
    } else {
        trimmed.to_string()
    }
}

/// Joins a base URL and a path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
