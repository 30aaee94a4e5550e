//! REST API client for the Bitpin cryptocurrency exchange
//!
//! This crate provides an async client for Bitpin's REST API, covering
//! market data, wallet balances and order management.
//!
//! # Features
//!
//! - **Market Data**: Currencies, markets, tickers, order book, recent trades
//! - **Wallets**: Balances filtered by asset and service
//! - **Trading**: Place, cancel and look up orders, fill history
//!
//! # Authentication
//!
//! Private endpoints send a bearer access token. The client logs in with an
//! API key pair, and before each authenticated call it checks the stored
//! tokens: an expired access token is refreshed, an expired refresh token
//! triggers a new login. A 401 from the server is returned as-is, never
//! retried.
//!
//! # Example
//!
//! ```no_run
//! use bitpin_rest::{BitpinRestClient, ClientConfig};
//! use bitpin_types::OrdersHistoryParams;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Public endpoints (no auth required)
//!     let client = BitpinRestClient::new();
//!     let tickers = client.get_tickers().await?;
//!     println!("{} tickers", tickers.len());
//!
//!     // Private endpoints (auth required)
//!     let config = ClientConfig::new().with_api_keys("api-key", "secret-key");
//!     let auth_client = BitpinRestClient::connect(config).await?;
//!     let open = auth_client.get_open_orders(&OrdersHistoryParams::new()).await?;
//!     println!("{} open orders", open.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every non-2xx response becomes an [`ApiError`](bitpin_types::ApiError)
//! whatever shape the server used for the body; see [`RestError`] for the
//! other failure kinds.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod lifecycle;
pub mod pipeline;
pub mod query;

// Re-export main types
pub use client::{BitpinRestClient, ClientConfig};
pub use error::{PreparationError, RestError, RestResult};
pub use pipeline::{ApiRequest, RequestPipeline, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
pub use query::QueryError;

// Re-export credential types
pub use bitpin_auth::{ApiKeyPair, AuthError, CredentialStore, DecodedToken, TokenKind, TokenStatus};
