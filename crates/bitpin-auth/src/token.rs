//! Bearer token decoding
//!
//! Tokens issued by the API are JWTs. The client only needs to read their
//! claims to know when they expire; signature verification is the server's
//! job, so the payload is decoded without checking the MAC.

use crate::error::{AuthError, AuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Which of the two session tokens a value refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived token sent with every authenticated request
    Access,
    /// Longer-lived token used to mint new access tokens
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims read from a bearer token
///
/// Always derived from the current token string; never cache one across
/// requests, the token may have been replaced in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodedToken {
    /// Token type claim ("access" or "refresh")
    #[serde(default)]
    pub token_type: Option<String>,
    /// Expiry as a unix timestamp (seconds)
    #[serde(rename = "exp")]
    pub expires_at: i64,
    /// Unique token id
    #[serde(rename = "jti", default)]
    pub token_id: String,
    /// User the token was issued to
    #[serde(rename = "user_id", default)]
    pub subject_id: Option<u64>,
    /// Source IPs the token is restricted to
    #[serde(rename = "ip", default)]
    pub allowed_ips: Option<Vec<String>>,
    /// API credential the token was issued for
    #[serde(default)]
    pub api_credential_id: Option<u64>,
}

impl DecodedToken {
    /// Decode the claims of a `header.payload.signature` token
    ///
    /// The signature is not verified.
    pub fn decode(token: &str) -> AuthResult<Self> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let header = decode_segment(header, "header")?;
        serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&header)
            .map_err(|e| AuthError::MalformedToken(format!("invalid header: {}", e)))?;

        let payload = decode_segment(payload, "payload")?;
        serde_json::from_slice(&payload)
            .map_err(|e| AuthError::MalformedToken(format!("invalid claims: {}", e)))
    }

    /// Check if the token expired before now
    pub fn is_expired(&self) -> bool {
        self.expires_before(Utc::now().timestamp())
    }

    /// Check if the token expires before now + `window`
    pub fn is_expiring_within(&self, window: Duration) -> bool {
        let window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        self.expires_before(Utc::now().timestamp().saturating_add(window_secs))
    }

    /// Check if the token expires strictly before the given unix timestamp
    pub fn expires_before(&self, unix_secs: i64) -> bool {
        self.expires_at < unix_secs
    }

    /// Time left until expiry, zero if already expired
    pub fn time_until_expiry(&self) -> Duration {
        let remaining = self.expires_at.saturating_sub(Utc::now().timestamp());
        Duration::from_secs(u64::try_from(remaining).unwrap_or(0))
    }

    /// Expiry as a UTC datetime
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }
}

impl std::fmt::Display for DecodedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Token Type: {}", self.token_type.as_deref().unwrap_or("-"))?;
        match self.expires_at_utc() {
            Some(at) => writeln!(f, "Expires: {} ({})", self.expires_at, at.to_rfc3339())?,
            None => writeln!(f, "Expires: {}", self.expires_at)?,
        }
        writeln!(f, "Token Id: {}", self.token_id)?;
        match self.subject_id {
            Some(id) => writeln!(f, "User Id: {}", id)?,
            None => writeln!(f, "User Id: -")?,
        }
        writeln!(f, "Ip: {}", self.allowed_ips.as_deref().unwrap_or_default().join(", "))?;
        match self.api_credential_id {
            Some(id) => write!(f, "Api Credential Id: {}", id),
            None => write!(f, "Api Credential Id: -"),
        }
    }
}

fn decode_segment(segment: &str, name: &str) -> AuthResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedToken(format!("invalid {} encoding: {}", name, e)))
}
