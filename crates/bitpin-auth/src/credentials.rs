//! Credential state shared by every request of a client
//!
//! # Security
//!
//! The secret key is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`
//!
//! Tokens are never printed by the `Debug` impl either.

use crate::error::{AuthError, AuthResult};
use crate::token::{DecodedToken, TokenKind};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "BITPIN_API_KEY";
/// Environment variable holding the secret key
pub const SECRET_KEY_ENV: &str = "BITPIN_SECRET_KEY";
/// Environment variable holding an access token
pub const ACCESS_TOKEN_ENV: &str = "BITPIN_ACCESS_TOKEN";
/// Environment variable holding a refresh token
pub const REFRESH_TOKEN_ENV: &str = "BITPIN_REFRESH_TOKEN";

/// API key and secret used to (re)authenticate
pub struct ApiKeyPair {
    api_key: String,
    /// Secret key stored securely (zeroized on drop)
    secret_key: SecretString,
}

impl ApiKeyPair {
    /// Create a key pair
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the secret key
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }

    /// Returns true if both halves are non-empty
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.expose_secret().is_empty()
    }
}

impl Clone for ApiKeyPair {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            secret_key: SecretString::from(self.secret_key.expose_secret().to_string()),
        }
    }
}

impl std::fmt::Debug for ApiKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyPair")
            .field(
                "api_key",
                &format!("{}...", self.api_key.chars().take(8).collect::<String>()),
            )
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Lifecycle state derived from the stored tokens
///
/// Computed on demand from the current tokens and the wall clock; never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// No tokens at all
    Unauthenticated,
    /// Access token present and not expired
    AccessValid,
    /// Access token expired, refresh token still usable
    AccessExpired,
    /// Refresh token expired (or missing with an expired access token), API keys available
    RefreshExpired,
    /// Refresh token expired and no API keys to re-authenticate with
    NoCredentials,
    /// A stored token could not be decoded
    Malformed(TokenKind),
}

#[derive(Default)]
struct Tokens {
    access: String,
    refresh: String,
}

/// Current tokens and API keys of a client
///
/// All reads and writes go through a lock, so one store can be shared by
/// concurrent requests. Multi-step updates (check expiry, then refresh) must
/// still be serialized by the caller.
pub struct CredentialStore {
    tokens: RwLock<Tokens>,
    api_keys: RwLock<Option<ApiKeyPair>>,
    /// Tokens as supplied at construction, kept for diagnostics
    initial_access: Option<String>,
    initial_refresh: Option<String>,
}

impl CredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(Tokens::default()),
            api_keys: RwLock::new(None),
            initial_access: None,
            initial_refresh: None,
        }
    }

    /// Seed the store with previously issued tokens
    ///
    /// Empty strings are treated as absent.
    pub fn with_tokens(mut self, access: impl Into<String>, refresh: impl Into<String>) -> Self {
        let access = access.into();
        let refresh = refresh.into();
        self.initial_access = Some(access.clone()).filter(|t| !t.is_empty());
        self.initial_refresh = Some(refresh.clone()).filter(|t| !t.is_empty());
        *self.tokens.get_mut() = Tokens { access, refresh };
        self
    }

    /// Attach an API key pair for (re)authentication
    pub fn with_api_keys(self, keys: ApiKeyPair) -> Self {
        *self.api_keys.write() = Some(keys);
        self
    }

    /// Create a store from environment variables
    ///
    /// Reads `BITPIN_API_KEY` and `BITPIN_SECRET_KEY` (required, as a pair)
    /// and the optional `BITPIN_ACCESS_TOKEN` and `BITPIN_REFRESH_TOKEN`.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(API_KEY_ENV.to_string()))?;
        let secret_key = std::env::var(SECRET_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(SECRET_KEY_ENV.to_string()))?;
        let access = std::env::var(ACCESS_TOKEN_ENV).unwrap_or_default();
        let refresh = std::env::var(REFRESH_TOKEN_ENV).unwrap_or_default();

        Ok(Self::new()
            .with_tokens(access, refresh)
            .with_api_keys(ApiKeyPair::new(api_key, secret_key)))
    }

    /// Current access token (empty if none)
    pub fn access_token(&self) -> String {
        self.tokens.read().access.clone()
    }

    /// Current refresh token (empty if none)
    pub fn refresh_token(&self) -> String {
        self.tokens.read().refresh.clone()
    }

    /// Returns true if an access token is set
    pub fn has_access_token(&self) -> bool {
        !self.tokens.read().access.is_empty()
    }

    /// Returns true if a refresh token is set
    pub fn has_refresh_token(&self) -> bool {
        !self.tokens.read().refresh.is_empty()
    }

    /// Returns true if both tokens are set
    pub fn is_authenticated(&self) -> bool {
        let tokens = self.tokens.read();
        !tokens.access.is_empty() && !tokens.refresh.is_empty()
    }

    /// Replace only the access token (refresh tokens are not rotated)
    pub fn set_access_token(&self, access: impl Into<String>) {
        self.tokens.write().access = access.into();
        debug!("Access token replaced");
    }

    /// Replace both tokens
    pub fn set_tokens(&self, access: impl Into<String>, refresh: impl Into<String>) {
        let mut tokens = self.tokens.write();
        tokens.access = access.into();
        tokens.refresh = refresh.into();
        debug!("Access and refresh tokens replaced");
    }

    /// API key pair, if both halves are non-empty
    pub fn api_keys(&self) -> Option<ApiKeyPair> {
        self.api_keys
            .read()
            .as_ref()
            .filter(|keys| keys.is_complete())
            .cloned()
    }

    /// Returns true if a complete API key pair is available
    pub fn has_api_keys(&self) -> bool {
        self.api_keys
            .read()
            .as_ref()
            .map(ApiKeyPair::is_complete)
            .unwrap_or(false)
    }

    /// Replace the API key pair
    pub fn set_api_keys(&self, keys: ApiKeyPair) {
        *self.api_keys.write() = Some(keys);
    }

    /// Check that both tokens are present
    ///
    /// This is the last gate before an `Authorization` header is attached.
    /// Token format is not checked here.
    pub fn assert_ready(&self) -> AuthResult<()> {
        let tokens = self.tokens.read();
        if tokens.access.is_empty() {
            return Err(AuthError::MissingAccessToken);
        }
        if tokens.refresh.is_empty() {
            return Err(AuthError::MissingRefreshToken);
        }
        Ok(())
    }

    /// Decode the current token of the given kind, `None` if it is empty
    pub fn decode(&self, kind: TokenKind) -> Option<AuthResult<DecodedToken>> {
        let token = match kind {
            TokenKind::Access => self.access_token(),
            TokenKind::Refresh => self.refresh_token(),
        };
        if token.is_empty() {
            None
        } else {
            Some(DecodedToken::decode(&token))
        }
    }

    /// Derive the lifecycle state from the current tokens
    pub fn status(&self) -> TokenStatus {
        let access = match self.decode(TokenKind::Access) {
            Some(Ok(decoded)) => Some(decoded.is_expired()),
            Some(Err(_)) => return TokenStatus::Malformed(TokenKind::Access),
            None => None,
        };
        let refresh = match self.decode(TokenKind::Refresh) {
            Some(Ok(decoded)) => Some(decoded.is_expired()),
            Some(Err(_)) => return TokenStatus::Malformed(TokenKind::Refresh),
            None => None,
        };

        let needs_reauth = match (access, refresh) {
            (None, None) => return TokenStatus::Unauthenticated,
            (_, Some(refresh_expired)) => refresh_expired,
            (Some(access_expired), None) => access_expired,
        };

        if needs_reauth {
            if self.has_api_keys() {
                TokenStatus::RefreshExpired
            } else {
                TokenStatus::NoCredentials
            }
        } else if access == Some(false) {
            TokenStatus::AccessValid
        } else {
            TokenStatus::AccessExpired
        }
    }

    /// Tokens as originally supplied, before any refresh replaced them
    pub fn initial_tokens(&self) -> (Option<&str>, Option<&str>) {
        (self.initial_access.as_deref(), self.initial_refresh.as_deref())
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_access_token", &self.has_access_token())
            .field("has_refresh_token", &self.has_refresh_token())
            .field("api_keys", &*self.api_keys.read())
            .finish()
    }
}
