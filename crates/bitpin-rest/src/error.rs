//! Error types for REST API operations

use crate::query::QueryError;
use bitpin_auth::{AuthError, TokenKind};
use bitpin_types::ApiError;

/// Errors that can occur before a request leaves the client
#[derive(Debug, thiserror::Error)]
pub enum PreparationError {
    /// GET parameters could not be encoded as a query string
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Request body could not be serialized to JSON
    #[error("failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),

    /// The HTTP request could not be built (e.g. invalid URL)
    #[error("failed to build request: {0}")]
    Builder(reqwest::Error),
}

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Request could not be prepared; nothing was sent
    #[error("Failed to prepare request: {0}")]
    RequestPreparation(#[from] PreparationError),

    /// Automatic refresh or re-authentication failed before the request
    #[error("Failed to refresh authentication: {0}")]
    AuthenticationFailed(Box<RestError>),

    /// A stored token could not be decoded
    #[error("Failed to decode {kind} token: {source}")]
    TokenDecodeFailed {
        /// Which token failed to decode
        kind: TokenKind,
        /// Decode error
        #[source]
        source: AuthError,
    },

    /// Credentials are missing or incomplete
    #[error("Authentication validation failed: {0}")]
    Auth(#[from] AuthError),

    /// Network or protocol failure while sending the request
    #[error("HTTP error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    ResponseRead(#[source] reqwest::Error),

    /// API returned a non-2xx status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 2xx body did not match the expected type
    #[error("Failed to decode response: {source}")]
    ResponseDecode {
        /// Decode error
        #[source]
        source: serde_json::Error,
        /// Start of the offending body, for diagnostics
        body: String,
    },

    /// Invalid request parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Client configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Bytes of a response body kept in [`RestError::ResponseDecode`]
const DECODE_BODY_PREVIEW: usize = 512;

impl RestError {
    pub(crate) fn decode(source: serde_json::Error, body: &[u8]) -> Self {
        let preview = &body[..body.len().min(DECODE_BODY_PREVIEW)];
        Self::ResponseDecode {
            source,
            body: String::from_utf8_lossy(preview).into_owned(),
        }
    }

    /// HTTP status of an API error
    pub fn status_code(&self) -> Option<u16> {
        self.api_error().map(|e| e.status_code)
    }

    /// The normalized API error, if the server answered with a non-2xx status
    ///
    /// Looks through [`RestError::AuthenticationFailed`], so a failed refresh
    /// call reports the server's answer too.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            Self::AuthenticationFailed(inner) => inner.api_error(),
            _ => None,
        }
    }

    /// The credential error at the root of this failure, if any
    pub fn auth_error(&self) -> Option<&AuthError> {
        match self {
            Self::Auth(error) => Some(error),
            Self::TokenDecodeFailed { source, .. } => Some(source),
            Self::AuthenticationFailed(inner) => inner.auth_error(),
            _ => None,
        }
    }

    /// Check if this error is caused by missing, invalid or rejected credentials
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::AuthenticationFailed(_) | Self::TokenDecodeFailed { .. } | Self::Auth(_) => true,
            Self::Api(error) => error.is_unauthorized(),
            _ => false,
        }
    }

    /// Check if this error indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api(error) if error.is_rate_limited())
    }

    /// Check if the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) | Self::ResponseRead(e) if e.is_timeout())
    }

    /// Check if repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::ResponseRead(_) => true,
            Self::Api(error) => error.is_rate_limited() || error.is_server_error(),
            _ => false,
        }
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
