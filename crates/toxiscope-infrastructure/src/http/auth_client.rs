//! Auth backend over the hosted service's `/auth/v1` API.
//!
//! The client persists tokens through the transport's [`TokenStore`] and
//! publishes every session change it causes on a broadcast channel, tagged
//! with a strictly increasing sequence number.
//!
//! [`TokenStore`]: toxiscope_core::local_state::TokenStore

use super::hosted::HostedService;
use super::transport::{Bearer, UnauthorizedPolicy};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use toxiscope_core::BackendError;
use toxiscope_core::session::{AuthBackend, AuthChange, Credentials, Identity, Role, Session, SessionTokens};

const CHANGE_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_metadata: serde_json::Value,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl AuthUser {
    fn role(&self) -> Role {
        let is_admin = [&self.app_metadata, &self.user_metadata]
            .iter()
            .any(|meta| meta.get("role").and_then(|r| r.as_str()) == Some("admin"));
        if is_admin { Role::Admin } else { Role::User }
    }

    fn into_identity(self) -> Identity {
        let role = self.role();
        Identity::new(self.id, self.email.unwrap_or_default()).with_role(role)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
        let tokens = SessionTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        };
        Session::new(self.user.into_identity(), tokens)
    }
}

pub struct HostedAuthClient {
    service: HostedService,
    sequence: AtomicU64,
    changes: broadcast::Sender<AuthChange>,
}

impl HostedAuthClient {
    pub fn new(service: HostedService) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            service,
            sequence: AtomicU64::new(0),
            changes,
        }
    }

    fn next_change(&self, session: Option<Session>) -> AuthChange {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        AuthChange { sequence, session }
    }

    fn publish(&self, change: &AuthChange) {
        // No receivers is fine; nobody is listening yet.
        let _ = self.changes.send(change.clone());
    }

    fn persist(&self, tokens: &SessionTokens) {
        if let Err(e) = self.service.transport().tokens().save_tokens(tokens) {
            tracing::warn!("Failed to persist session tokens: {}", e);
        }
    }

    fn forget(&self) {
        if let Err(e) = self.service.transport().tokens().clear_tokens() {
            tracing::warn!("Failed to clear session tokens: {}", e);
        }
    }

    fn establish(&self, response: TokenResponse) -> AuthChange {
        let session = response.into_session(Utc::now());
        self.persist(&session.tokens);
        let change = self.next_change(Some(session));
        tracing::info!(sequence = change.sequence, "Session established");
        self.publish(&change);
        change
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, BackendError> {
        let request = self
            .service
            .request(Method::POST, "/auth/v1/token?grant_type=refresh_token", Bearer::None)
            .json(&json!({ "refresh_token": refresh_token }));
        self.service
            .transport()
            .execute_json(request, UnauthorizedPolicy::Report)
            .await
    }

    async fn fetch_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let request = self
            .service
            .request(Method::GET, "/auth/v1/user", Bearer::Explicit(access_token));
        self.service
            .transport()
            .execute_json(request, UnauthorizedPolicy::Report)
            .await
    }
}

fn is_expired(tokens: &SessionTokens, now: DateTime<Utc>) -> bool {
    tokens.expires_at.is_some_and(|at| at <= now)
}

fn is_rejected(err: &BackendError) -> bool {
    matches!(err, BackendError::Unauthorized)
        || matches!(err, BackendError::Status { status, .. } if (400..500).contains(status))
}

#[async_trait]
impl AuthBackend for HostedAuthClient {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        let Some(tokens) = self.service.transport().tokens().load_tokens() else {
            return Ok(None);
        };

        if is_expired(&tokens, Utc::now()) {
            let Some(refresh_token) = tokens.refresh_token.clone() else {
                tracing::debug!("Persisted session expired without a refresh token");
                self.forget();
                return Ok(None);
            };
            match self.refresh(&refresh_token).await {
                Ok(response) => {
                    let change = self.establish(response);
                    return Ok(change.session);
                }
                Err(e) if is_rejected(&e) => {
                    tracing::debug!("Refresh rejected: {}", e);
                    self.forget();
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }

        match self.fetch_user(&tokens.access_token).await {
            Ok(user) => Ok(Some(Session::new(user.into_identity(), tokens))),
            Err(e) if is_rejected(&e) => {
                tracing::debug!("Persisted session rejected: {}", e);
                self.forget();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn changes(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthChange, BackendError> {
        let request = self
            .service
            .request(Method::POST, "/auth/v1/token?grant_type=password", Bearer::None)
            .json(&json!({ "email": credentials.email.trim(), "password": credentials.password }));
        let response: TokenResponse = self
            .service
            .transport()
            .execute_json(request, UnauthorizedPolicy::Report)
            .await?;
        Ok(self.establish(response))
    }

    async fn sign_up_with_password(&self, credentials: &Credentials) -> Result<AuthChange, BackendError> {
        let request = self
            .service
            .request(Method::POST, "/auth/v1/signup", Bearer::None)
            .json(&json!({ "email": credentials.email.trim(), "password": credentials.password }));
        let body: serde_json::Value = self
            .service
            .transport()
            .execute_json(request, UnauthorizedPolicy::Report)
            .await?;

        // Without auto-confirm the service answers with the bare user and no session.
        if body.get("access_token").is_none() {
            return Err(BackendError::status(
                202,
                "Account created. Check your email to confirm it, then sign in",
            ));
        }
        let response: TokenResponse =
            serde_json::from_value(body).map_err(|e| BackendError::decode(e.to_string()))?;
        Ok(self.establish(response))
    }

    async fn sign_out(&self, session: &Session) -> Result<AuthChange, BackendError> {
        let request = self.service.request(
            Method::POST,
            "/auth/v1/logout",
            Bearer::Explicit(&session.tokens.access_token),
        );
        match self
            .service
            .transport()
            .execute(request, UnauthorizedPolicy::Report)
            .await
        {
            Ok(_) => {}
            // The token is already dead on the server side.
            Err(BackendError::Unauthorized) => {
                tracing::debug!("Logout with an already-invalid token");
            }
            Err(e) => return Err(e),
        }

        self.forget();
        let change = self.next_change(None);
        tracing::info!(sequence = change.sequence, user_id = %session.user_id(), "Signed out");
        self.publish(&change);
        Ok(change)
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<(), BackendError> {
        let request = self
            .service
            .request(Method::PUT, "/auth/v1/user", Bearer::Explicit(&session.tokens.access_token))
            .json(&json!({ "password": new_password }));
        self.service
            .transport()
            .execute(request, UnauthorizedPolicy::Notify)
            .await?;
        tracing::info!(user_id = %session.user_id(), "Password updated");
        Ok(())
    }
}
