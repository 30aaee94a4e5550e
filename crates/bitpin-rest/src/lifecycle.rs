//! Token lifecycle: refresh and re-authentication
//!
//! Before an authenticated call the pipeline inspects the stored tokens:
//!
//! - refresh token expired (or access token expired with no refresh token to
//!   use): re-authenticate with the API key pair, replacing both tokens
//! - only the access token expired: refresh it, keeping the refresh token
//! - otherwise: nothing to do
//!
//! Every check-then-update sequence holds the pipeline's session lock, so
//! concurrent requests never refresh the same expired token twice.

use crate::error::{RestError, RestResult};
use crate::pipeline::{ApiRequest, RequestPipeline};
use bitpin_auth::{ApiKeyPair, AuthError, TokenKind};
use bitpin_types::{
    AuthenticationParams, AuthenticationResponse, RefreshTokenParams, RefreshTokenResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Exchange an API key pair for a token pair
pub const AUTHENTICATE_PATH: &str = "/usr/authenticate/";

/// Exchange a refresh token for a new access token
pub const REFRESH_TOKEN_PATH: &str = "/usr/refresh_token/";

/// What [`RequestPipeline::ensure_fresh`] has to do for the current tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionAction {
    None,
    Refresh,
    Reauthenticate,
}

impl RequestPipeline {
    /// Bring the session up to date if a token has expired
    ///
    /// Makes no network call when no token has expired. Fails with
    /// [`AuthError::MissingCredentials`] (and makes no call) when
    /// re-authentication is needed but no API key pair is configured.
    #[instrument(skip(self))]
    pub async fn ensure_fresh(&self) -> RestResult<()> {
        let _session = self.session_lock.lock().await;
        self.ensure_fresh_locked().await
    }

    /// Refresh the access token using the stored refresh token
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RestResult<()> {
        let _session = self.session_lock.lock().await;
        self.refresh_locked().await
    }

    /// Exchange an API key pair for a fresh token pair
    ///
    /// On success both stored tokens are replaced and the key pair is kept
    /// for later re-authentication.
    #[instrument(skip(self, api_key, secret_key))]
    pub async fn authenticate(
        &self,
        api_key: &str,
        secret_key: &str,
    ) -> RestResult<AuthenticationResponse> {
        let keys = ApiKeyPair::new(api_key, secret_key);
        if !keys.is_complete() {
            return Err(AuthError::MissingCredentials.into());
        }

        let _session = self.session_lock.lock().await;
        self.authenticate_locked(keys).await
    }

    /// Startup sequence: refresh supplied tokens, then log in if still unauthenticated
    pub(crate) async fn bootstrap(&self, auto_auth: bool) -> RestResult<()> {
        let _session = self.session_lock.lock().await;

        if self.auto_refresh
            && (self.credentials.has_access_token() || self.credentials.has_refresh_token())
        {
            self.ensure_fresh_locked().await?;
        }

        if auto_auth && !self.credentials.is_authenticated() {
            if let Some(keys) = self.credentials.api_keys() {
                debug!("No usable token pair, authenticating with API keys");
                self.authenticate_locked(keys).await?;
            }
        }

        Ok(())
    }

    fn session_action(&self) -> RestResult<SessionAction> {
        let access_expired = self.token_expired(TokenKind::Access)?;
        let refresh_expired = self.token_expired(TokenKind::Refresh)?;

        Ok(match (access_expired, refresh_expired) {
            (_, Some(true)) => SessionAction::Reauthenticate,
            (Some(true), None) => SessionAction::Reauthenticate,
            (Some(true), Some(false)) => SessionAction::Refresh,
            _ => SessionAction::None,
        })
    }

    /// `None` if the token is not set
    fn token_expired(&self, kind: TokenKind) -> RestResult<Option<bool>> {
        match self.credentials.decode(kind) {
            Some(Ok(token)) => Ok(Some(token.is_expired())),
            Some(Err(source)) => Err(RestError::TokenDecodeFailed { kind, source }),
            None => Ok(None),
        }
    }

    async fn ensure_fresh_locked(&self) -> RestResult<()> {
        match self.session_action()? {
            SessionAction::None => Ok(()),
            SessionAction::Refresh => {
                debug!("Access token expired, refreshing");
                self.refresh_locked().await
            }
            SessionAction::Reauthenticate => {
                let keys = self
                    .credentials
                    .api_keys()
                    .ok_or(AuthError::MissingCredentials)?;
                warn!("Refresh token unusable, re-authenticating with API keys");
                self.authenticate_locked(keys).await.map(|_| ())
            }
        }
    }

    async fn refresh_locked(&self) -> RestResult<()> {
        let refresh = self.credentials.refresh_token();
        if refresh.is_empty() {
            return Err(AuthError::MissingRefreshToken.into());
        }

        let params = RefreshTokenParams { refresh };
        let response: RefreshTokenResponse =
            self.post_unauthenticated(REFRESH_TOKEN_PATH, &params).await?;

        self.credentials.set_access_token(response.access);
        info!("Access token refreshed");
        Ok(())
    }

    async fn authenticate_locked(&self, keys: ApiKeyPair) -> RestResult<AuthenticationResponse> {
        let params = AuthenticationParams {
            api_key: keys.api_key().to_string(),
            secret_key: keys.secret_key().to_string(),
        };
        let response: AuthenticationResponse =
            self.post_unauthenticated(AUTHENTICATE_PATH, &params).await?;

        self.credentials
            .set_tokens(response.access.clone(), response.refresh.clone());
        self.credentials.set_api_keys(keys);
        info!("Authenticated with API keys");
        Ok(response)
    }

    /// POST straight to the transport, bypassing the session checks
    async fn post_unauthenticated<B, R>(&self, path: &str, body: &B) -> RestResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let prepared = self.prepare(&ApiRequest::post(path).with_body(body))?;
        let raw = self.dispatch(prepared, None).await?;
        serde_json::from_slice(&raw).map_err(|e| RestError::decode(e, &raw))
    }
}
