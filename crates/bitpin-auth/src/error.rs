//! Error types for authentication operations

/// Errors that can occur while decoding tokens or checking credentials
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Token is not a decodable `header.payload.signature` string
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// No access token is set
    #[error("Access token is empty")]
    MissingAccessToken,

    /// No refresh token is set
    #[error("Refresh token is empty")]
    MissingRefreshToken,

    /// API key and/or secret key are empty
    #[error("API key and/or secret key are empty")]
    MissingCredentials,

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

impl AuthError {
    /// Returns true if the error means a token is absent
    pub fn is_missing_token(&self) -> bool {
        matches!(self, Self::MissingAccessToken | Self::MissingRefreshToken)
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
