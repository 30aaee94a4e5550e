//! Authentication request and response bodies
//!
//! `Debug` output never includes secrets or tokens.

use serde::{Deserialize, Serialize};

/// Body of `POST /usr/authenticate/`
#[derive(Clone, Serialize)]
pub struct AuthenticationParams {
    /// API key
    pub api_key: String,
    /// Secret key
    pub secret_key: String,
}

impl std::fmt::Debug for AuthenticationParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationParams")
            .field("api_key", &redact_prefix(&self.api_key))
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Response of `POST /usr/authenticate/`
#[derive(Clone, Deserialize)]
pub struct AuthenticationResponse {
    /// Refresh token
    pub refresh: String,
    /// Access token
    pub access: String,
}

impl std::fmt::Debug for AuthenticationResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationResponse")
            .field("refresh", &"[REDACTED]")
            .field("access", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /usr/refresh_token/`
#[derive(Clone, Serialize)]
pub struct RefreshTokenParams {
    /// Refresh token
    pub refresh: String,
}

impl std::fmt::Debug for RefreshTokenParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenParams")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Response of `POST /usr/refresh_token/`
#[derive(Clone, Deserialize)]
pub struct RefreshTokenResponse {
    /// New access token
    pub access: String,
}

impl std::fmt::Debug for RefreshTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenResponse")
            .field("access", &"[REDACTED]")
            .finish()
    }
}

fn redact_prefix(value: &str) -> String {
    let end = value
        .char_indices()
        .nth(8)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len());
    format!("{}...", &value[..end])
}
