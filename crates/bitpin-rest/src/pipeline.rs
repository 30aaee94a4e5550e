//! Request pipeline shared by every endpoint
//!
//! Each call goes through the same steps:
//!
//! 1. Encode the payload: query string for GET, JSON body otherwise.
//! 2. For authenticated calls, bring the session up to date (see
//!    [`lifecycle`](crate::lifecycle)) and attach the bearer token.
//! 3. Send, then fold any non-2xx answer into an [`ApiError`].
//! 4. Decode the 2xx body into the caller's type.

use crate::error::{PreparationError, RestError, RestResult};
use crate::query;
use bitpin_auth::CredentialStore;
use bitpin_types::ApiError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.bitpin.ir";

/// API version used when a request does not override it
pub const DEFAULT_API_VERSION: &str = "v1";

/// Description of one API call
///
/// # Example
///
/// ```
/// use bitpin_rest::ApiRequest;
/// use bitpin_types::WalletParams;
///
/// let params = WalletParams::new().assets(["BTC"]);
/// let request = ApiRequest::get("/wlt/wallets/").with_body(&params).authenticated();
/// assert!(request.requires_auth());
/// ```
pub struct ApiRequest<'a, B: ?Sized = ()> {
    method: Method,
    path: String,
    version: Option<String>,
    auth: bool,
    body: Option<&'a B>,
}

impl<'a> ApiRequest<'a, ()> {
    /// Request without a payload
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            version: None,
            auth: false,
            body: None,
        }
    }

    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

impl<'a, B: ?Sized> ApiRequest<'a, B> {
    /// Attach a payload: query parameters for GET, a JSON body otherwise
    pub fn with_body<C: ?Sized>(self, body: &'a C) -> ApiRequest<'a, C> {
        ApiRequest {
            method: self.method,
            path: self.path,
            version: self.version,
            auth: self.auth,
            body: Some(body),
        }
    }

    /// Require a bearer token
    pub fn authenticated(mut self) -> Self {
        self.auth = true;
        self
    }

    /// Override the API version segment of the URL
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Endpoint path, e.g. `/mkt/markets/`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if the call needs a bearer token
    pub fn requires_auth(&self) -> bool {
        self.auth
    }
}

impl<B: ?Sized> std::fmt::Debug for ApiRequest<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("version", &self.version)
            .field("auth", &self.auth)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// A request with its URL and payload resolved, ready to send
pub(crate) struct PreparedRequest {
    method: Method,
    url: String,
    body: Option<Vec<u8>>,
}

/// HTTP transport plus the session it authenticates with
pub struct RequestPipeline {
    http: Client,
    base_url: String,
    api_version: String,
    pub(crate) credentials: Arc<CredentialStore>,
    pub(crate) auto_refresh: bool,
    /// Serializes check-then-update sequences on the credentials
    pub(crate) session_lock: Mutex<()>,
}

impl RequestPipeline {
    pub(crate) fn new(
        http: Client,
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        credentials: Arc<CredentialStore>,
        auto_refresh: bool,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            api_version: api_version.into(),
            credentials,
            auto_refresh,
            session_lock: Mutex::new(()),
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default API version
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Credentials used for authenticated calls
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Full URL for an endpoint: `{base}/api/{version}{path}`
    pub fn endpoint_url(&self, path: &str, version: Option<&str>) -> String {
        format!(
            "{}/api/{}{}",
            self.base_url,
            version.unwrap_or(&self.api_version),
            path
        )
    }

    /// Run a request and decode the 2xx body into `R`
    pub async fn execute<B, R>(&self, request: ApiRequest<'_, B>) -> RestResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = self.send(&request).await?;
        serde_json::from_slice(&body).map_err(|e| RestError::decode(e, &body))
    }

    /// Run a request whose 2xx body carries nothing of interest
    pub async fn execute_unit<B>(&self, request: ApiRequest<'_, B>) -> RestResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(&request).await.map(|_| ())
    }

    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path, auth = request.auth))]
    async fn send<B>(&self, request: &ApiRequest<'_, B>) -> RestResult<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let prepared = self.prepare(request)?;

        let bearer = if request.auth {
            Some(self.authorize().await?)
        } else {
            None
        };

        self.dispatch(prepared, bearer).await
    }

    /// Resolve URL and payload; performs no I/O
    pub(crate) fn prepare<B>(&self, request: &ApiRequest<'_, B>) -> RestResult<PreparedRequest>
    where
        B: Serialize + ?Sized,
    {
        let mut url = self.endpoint_url(&request.path, request.version.as_deref());
        let mut body = None;

        if let Some(payload) = request.body {
            if request.method == Method::GET {
                let query = query::encode(payload).map_err(PreparationError::from)?;
                if !query.is_empty() {
                    url.push('?');
                    url.push_str(&query);
                }
            } else {
                body = Some(serde_json::to_vec(payload).map_err(PreparationError::from)?);
            }
        }

        Ok(PreparedRequest {
            method: request.method.clone(),
            url,
            body,
        })
    }

    /// Make sure the session is usable and return the access token to send
    async fn authorize(&self) -> RestResult<String> {
        if self.auto_refresh {
            self.ensure_fresh()
                .await
                .map_err(|e| RestError::AuthenticationFailed(Box::new(e)))?;
        }

        self.credentials.assert_ready()?;
        Ok(self.credentials.access_token())
    }

    /// Send a prepared request; no credential handling happens here
    pub(crate) async fn dispatch(
        &self,
        prepared: PreparedRequest,
        bearer: Option<String>,
    ) -> RestResult<Vec<u8>> {
        let mut builder = self
            .http
            .request(prepared.method, &prepared.url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        debug!(url = %prepared.url, "Sending request");

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                RestError::RequestPreparation(PreparationError::Builder(e))
            } else {
                RestError::Transport(e)
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(RestError::ResponseRead)?
            .to_vec();

        if !status.is_success() {
            let error = ApiError::normalize(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %error.message, "API returned an error");
            return Err(RestError::Api(error));
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Request succeeded");
        Ok(body)
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("credentials", &self.credentials)
            .field("auto_refresh", &self.auto_refresh)
            .finish()
    }
}
