//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Identity, tokens, `Session`, the tagged `SessionState` and `AuthChange`
//! - `backend`: `AuthBackend` trait and the `UnauthorizedHandler` hook

mod backend;
mod model;

pub use backend::{AuthBackend, UnauthorizedHandler};
pub use model::{AuthChange, Credentials, Identity, Role, Session, SessionState, SessionTokens, UserId};

/// Minimum password length accepted by the auth service.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Local checks run before sign-up or a password change reaches the network.
pub fn validate_password(password: &str) -> Result<(), crate::ClientError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(crate::ClientError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_credentials(credentials: &Credentials) -> Result<(), crate::ClientError> {
    let email = credentials.email.trim();
    if email.is_empty() || credentials.password.is_empty() {
        return Err(crate::ClientError::validation("Email and password are required"));
    }
    if !email.contains('@') {
        return Err(crate::ClientError::validation("Please enter a valid email address"));
    }
    Ok(())
}
