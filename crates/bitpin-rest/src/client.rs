//! Main REST client implementation

use crate::endpoints::{MarketEndpoints, TradingEndpoints, WalletEndpoints};
use crate::error::{RestError, RestResult};
use crate::pipeline::{ApiRequest, RequestPipeline, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use bitpin_auth::{
    ApiKeyPair, CredentialStore, TokenStatus, ACCESS_TOKEN_ENV, API_KEY_ENV, REFRESH_TOKEN_ENV,
    SECRET_KEY_ENV,
};
use bitpin_types::{
    AuthenticationResponse, CreateOrderParams, Currency, Market, OrderBook, OrderStatus,
    OrdersHistoryParams, Ticker, Trade, UserTrade, UserTradesParams, Wallet, WalletParams,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the API host
pub const BASE_URL_ENV: &str = "BITPIN_BASE_URL";

/// Bitpin REST API client
///
/// Cheap to clone; clones share one credential state.
///
/// # Example
///
/// ```no_run
/// use bitpin_rest::{BitpinRestClient, ClientConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = BitpinRestClient::new();
///     let book = client.get_order_book("BTC_USDT").await?;
///
///     // Authenticates with the API keys from the environment
///     let client = BitpinRestClient::connect(ClientConfig::from_env()?).await?;
///     let wallets = client.get_wallets(&Default::default()).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BitpinRestClient {
    pipeline: Arc<RequestPipeline>,
}

impl BitpinRestClient {
    /// Create a new client without credentials
    ///
    /// Only public endpoints will be available. Should the HTTP client fail
    /// to build, a warning is logged and reqwest's default client (no request
    /// timeout) is used instead.
    pub fn new() -> Self {
        let config = ClientConfig::default();
        let http = http_client_or_default(&config);
        Self::from_parts(config, http)
    }

    /// Create a new client with custom configuration
    ///
    /// Makes no network call: supplied tokens are used as-is until the first
    /// authenticated request. Use [`connect`](Self::connect) to refresh or
    /// log in up front.
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let http = match config.http_client.clone() {
            Some(http) => http,
            None => build_http_client(&config)?,
        };
        Ok(Self::from_parts(config, http))
    }

    /// Create a client and bring its session up to date
    ///
    /// With `auto_refresh`, supplied tokens are refreshed (or replaced by a
    /// new login) if expired. With `auto_auth`, the client then logs in with
    /// its API key pair unless it already holds both tokens.
    #[instrument(skip(config), fields(base_url = %config.base_url))]
    pub async fn connect(config: ClientConfig) -> RestResult<Self> {
        let auto_auth = config.auto_auth;
        let client = Self::with_config(config)?;
        client.pipeline.bootstrap(auto_auth).await?;
        Ok(client)
    }

    fn from_parts(config: ClientConfig, http: Client) -> Self {
        let mut credentials = CredentialStore::new();
        if config.access_token.is_some() || config.refresh_token.is_some() {
            credentials = credentials.with_tokens(
                config.access_token.unwrap_or_default(),
                config.refresh_token.unwrap_or_default(),
            );
        }
        if let Some(keys) = config.api_keys {
            credentials = credentials.with_api_keys(keys);
        }

        let pipeline = RequestPipeline::new(
            http,
            config.base_url,
            config.api_version,
            Arc::new(credentials),
            config.auto_refresh,
        );

        info!(base_url = pipeline.base_url(), "Created Bitpin REST client");

        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.pipeline.base_url()
    }

    /// Current credential state
    pub fn credentials(&self) -> &CredentialStore {
        self.pipeline.credentials()
    }

    /// Check if the client holds both tokens
    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_authenticated()
    }

    /// Lifecycle state of the stored tokens
    pub fn token_status(&self) -> TokenStatus {
        self.credentials().status()
    }

    /// Tokens as supplied in the configuration, before any refresh replaced them
    pub fn initial_tokens(&self) -> (Option<&str>, Option<&str>) {
        self.credentials().initial_tokens()
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Log in with an API key pair, replacing both tokens
    pub async fn authenticate(
        &self,
        api_key: &str,
        secret_key: &str,
    ) -> RestResult<AuthenticationResponse> {
        self.pipeline.authenticate(api_key, secret_key).await
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh_access_token(&self) -> RestResult<()> {
        self.pipeline.refresh().await
    }

    /// Refresh or re-authenticate if a stored token has expired
    pub async fn ensure_fresh(&self) -> RestResult<()> {
        self.pipeline.ensure_fresh().await
    }

    /// Send an arbitrary request through the client's pipeline
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bitpin_rest::{ApiRequest, BitpinRestClient};
    /// use bitpin_types::Market;
    ///
    /// # async fn run(client: BitpinRestClient) -> Result<(), bitpin_rest::RestError> {
    /// let markets: Vec<Market> = client
    ///     .request(ApiRequest::get("/mkt/markets/").version("v1"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn request<B, R>(&self, request: ApiRequest<'_, B>) -> RestResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.pipeline.execute(request).await
    }

    // ========================================================================
    // Public Market Endpoints
    // ========================================================================

    /// Get market endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(&self.pipeline)
    }

    /// List supported currencies
    pub async fn get_currencies(&self) -> RestResult<Vec<Currency>> {
        self.market().get_currencies().await
    }

    /// List markets
    pub async fn get_markets(&self) -> RestResult<Vec<Market>> {
        self.market().get_markets().await
    }

    /// Latest ticker for every market
    pub async fn get_tickers(&self) -> RestResult<Vec<Ticker>> {
        self.market().get_tickers().await
    }

    /// Order book snapshot for a market
    pub async fn get_order_book(&self, symbol: &str) -> RestResult<OrderBook> {
        self.market().get_order_book(symbol).await
    }

    /// Most recent public trades of a market
    pub async fn get_recent_trades(&self, symbol: &str) -> RestResult<Vec<Trade>> {
        self.market().get_recent_trades(symbol).await
    }

    // ========================================================================
    // Private Wallet Endpoints
    // ========================================================================

    /// Get wallet endpoints
    pub fn wallets(&self) -> WalletEndpoints<'_> {
        WalletEndpoints::new(&self.pipeline)
    }

    /// List wallets
    pub async fn get_wallets(&self, params: &WalletParams) -> RestResult<Vec<Wallet>> {
        self.wallets().get_wallets(params).await
    }

    // ========================================================================
    // Private Trading Endpoints
    // ========================================================================

    /// Get trading endpoints
    pub fn trading(&self) -> TradingEndpoints<'_> {
        TradingEndpoints::new(&self.pipeline)
    }

    /// Place a new order
    pub async fn create_order(&self, order: &CreateOrderParams) -> RestResult<OrderStatus> {
        self.trading().create_order(order).await
    }

    /// Cancel an order by id
    pub async fn cancel_order(&self, order_id: u64) -> RestResult<()> {
        self.trading().cancel_order(order_id).await
    }

    /// Order history
    pub async fn get_orders_history(
        &self,
        params: &OrdersHistoryParams,
    ) -> RestResult<Vec<OrderStatus>> {
        self.trading().get_orders_history(params).await
    }

    /// Open orders
    pub async fn get_open_orders(&self, params: &OrdersHistoryParams) -> RestResult<Vec<OrderStatus>> {
        self.trading().get_open_orders(params).await
    }

    /// Status of specific orders
    pub async fn get_order_statuses(&self, order_ids: &[u64]) -> RestResult<Vec<OrderStatus>> {
        self.trading().get_order_statuses(order_ids).await
    }

    /// Fills of the authenticated user
    pub async fn get_user_trades(&self, params: &UserTradesParams) -> RestResult<Vec<UserTrade>> {
        self.trading().get_user_trades(params).await
    }
}

impl Default for BitpinRestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BitpinRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitpinRestClient")
            .field("base_url", &self.base_url())
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}

fn http_client_or_default(config: &ClientConfig) -> Client {
    build_http_client(config).unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default HTTP client without timeout");
        Client::default()
    })
}

fn build_http_client(config: &ClientConfig) -> RestResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(
            config
                .user_agent
                .as_deref()
                .unwrap_or(concat!("bitpin-rest/", env!("CARGO_PKG_VERSION"))),
        )
        .build()
        .map_err(|e| RestError::Config(format!("failed to create HTTP client: {}", e)))
}

/// Client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// API host, without the `/api/{version}` suffix
    pub base_url: String,
    /// Default API version
    pub api_version: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Custom user agent
    pub user_agent: Option<String>,
    /// Pre-built HTTP client; `timeout_secs` and `user_agent` are ignored when set
    pub http_client: Option<Client>,
    /// Previously issued access token
    pub access_token: Option<String>,
    /// Previously issued refresh token
    pub refresh_token: Option<String>,
    /// API key pair for (re)authentication
    pub api_keys: Option<ApiKeyPair>,
    /// Log in on [`BitpinRestClient::connect`] when no token pair was supplied
    pub auto_auth: bool,
    /// Refresh expired tokens on connect and before every authenticated call
    pub auto_refresh: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            http_client: None,
            access_token: None,
            refresh_token: None,
            api_keys: None,
            auto_auth: true,
            auto_refresh: true,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from environment variables
    ///
    /// Reads `BITPIN_API_KEY` and `BITPIN_SECRET_KEY` (optional, but only as
    /// a pair), `BITPIN_ACCESS_TOKEN`, `BITPIN_REFRESH_TOKEN` and
    /// `BITPIN_BASE_URL`. Empty variables count as unset.
    pub fn from_env() -> RestResult<Self> {
        let mut config = Self::default();

        match (env_var(API_KEY_ENV), env_var(SECRET_KEY_ENV)) {
            (Some(api_key), Some(secret_key)) => {
                config = config.with_api_keys(api_key, secret_key);
            }
            (Some(_), None) => return Err(missing_env(SECRET_KEY_ENV)),
            (None, Some(_)) => return Err(missing_env(API_KEY_ENV)),
            (None, None) => {}
        }

        config.access_token = env_var(ACCESS_TOKEN_ENV);
        config.refresh_token = env_var(REFRESH_TOKEN_ENV);
        if let Some(base_url) = env_var(BASE_URL_ENV) {
            config.base_url = base_url;
        }

        Ok(config)
    }

    /// Set the API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the default API version
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a pre-built HTTP client
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Seed previously issued tokens
    pub fn with_tokens(mut self, access: impl Into<String>, refresh: impl Into<String>) -> Self {
        self.access_token = Some(access.into());
        self.refresh_token = Some(refresh.into());
        self
    }

    /// Set the API key pair
    pub fn with_api_keys(mut self, api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.api_keys = Some(ApiKeyPair::new(api_key, secret_key));
        self
    }

    /// Enable or disable login on connect
    pub fn with_auto_auth(mut self, enabled: bool) -> Self {
        self.auto_auth = enabled;
        self
    }

    /// Enable or disable automatic token refresh
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("has_http_client", &self.http_client.is_some())
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("api_keys", &self.api_keys)
            .field("auto_auth", &self.auto_auth)
            .field("auto_refresh", &self.auto_refresh)
            .finish()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn missing_env(name: &str) -> RestError {
    RestError::Config(format!("environment variable not set: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_without_credentials() {
        let client = BitpinRestClient::new();
        assert!(!client.is_authenticated());
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.token_status(), TokenStatus::Unauthenticated);
    }

    #[test]
    fn test_http_client_build_failure() {
        let config = ClientConfig::new().with_user_agent("bad\nagent");
        assert!(matches!(
            BitpinRestClient::with_config(config.clone()),
            Err(RestError::Config(_))
        ));

        // Falls back instead of panicking
        let _client = http_client_or_default(&config);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(60)
            .with_user_agent("test-agent")
            .with_base_url("http://localhost:8080/")
            .with_api_version("v2")
            .with_auto_refresh(false)
            .with_auto_auth(false);

        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.user_agent, Some("test-agent".to_string()));
        assert_eq!(config.api_version, "v2");
        assert!(!config.auto_refresh);
        assert!(!config.auto_auth);

        let client = BitpinRestClient::with_config(config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_with_config_keeps_supplied_tokens() {
        let config = ClientConfig::new()
            .with_tokens("access", "refresh")
            .with_api_keys("key", "secret");
        let client = BitpinRestClient::with_config(config).unwrap();

        assert!(client.is_authenticated());
        assert_eq!(client.credentials().access_token(), "access");
        assert_eq!(client.initial_tokens(), (Some("access"), Some("refresh")));
        assert!(client.credentials().has_api_keys());
    }

    #[test]
    fn test_clones_share_credentials() {
        let client = BitpinRestClient::with_config(ClientConfig::new()).unwrap();
        let clone = client.clone();
        client.credentials().set_tokens("a", "r");
        assert!(clone.is_authenticated());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let client =
            BitpinRestClient::with_config(ClientConfig::new().with_tokens("secret-access", "r"))
                .unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-access"));
        assert!(debug.contains("is_authenticated: true"));
    }

    #[tokio::test]
    async fn test_invalid_order_rejected_locally() {
        let client = BitpinRestClient::new();
        let order = CreateOrderParams::market("", bitpin_types::Side::Buy, rust_decimal::Decimal::ONE);
        let result = client.create_order(&order).await;
        assert!(matches!(result, Err(RestError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn test_invalid_symbol_rejected_locally() {
        let client = BitpinRestClient::new();
        assert!(matches!(
            client.get_order_book("").await,
            Err(RestError::InvalidParameter(_))
        ));
        assert!(matches!(
            client.get_order_statuses(&[]).await,
            Err(RestError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_requires_both_keys() {
        let client = BitpinRestClient::new();
        let err = client.authenticate("key", "").await.unwrap_err();
        assert_eq!(err.auth_error(), Some(&bitpin_auth::AuthError::MissingCredentials));
    }
}
