//! Shared types for the Bitpin REST API
//!
//! This crate provides the request and response definitions used across the
//! Bitpin SDK, together with the normalized [`ApiError`] that every non-2xx
//! response is folded into. It has no networking dependencies and can be used
//! independently.
//!
//! # Key Types
//!
//! - [`Currency`], [`Market`], [`Ticker`], [`OrderBook`], [`Trade`] - Public market data
//! - [`Wallet`], [`WalletParams`] - Wallet balances
//! - [`OrderStatus`], [`CreateOrderParams`], [`OrdersHistoryParams`] - Order management
//! - [`UserTrade`], [`UserTradesParams`] - Fill history
//! - [`Side`], [`OrderType`] - Enums shared by requests and responses
//! - [`ApiError`] - Normalized API error

pub mod auth;
pub mod enums;
pub mod error;
pub mod market;
pub mod order;
pub mod wallet;

// Re-export commonly used types
pub use auth::*;
pub use enums::*;
pub use error::*;
pub use market::*;
pub use order::*;
pub use wallet::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
