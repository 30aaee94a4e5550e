//! Wallet types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance of one asset in one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Wallet identifier
    pub id: u64,
    /// Asset code (e.g., "BTC")
    pub asset: String,
    /// Total balance
    pub balance: String,
    /// Amount locked in open orders or withdrawals
    pub frozen: String,
    /// Service the wallet belongs to (e.g., "spot")
    pub service: String,
}

impl Wallet {
    /// Total balance
    pub fn balance_decimal(&self) -> Option<Decimal> {
        self.balance.parse().ok()
    }

    /// Frozen amount
    pub fn frozen_decimal(&self) -> Option<Decimal> {
        self.frozen.parse().ok()
    }

    /// Balance that is not frozen
    pub fn available(&self) -> Option<Decimal> {
        Some(self.balance_decimal()? - self.frozen_decimal()?)
    }
}

/// Filters for the wallet listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WalletParams {
    /// Assets to include; each becomes a repeated `assets` query key
    pub assets: Vec<String>,
    /// Service filter
    pub service: Option<String>,
    /// Pagination offset
    pub offset: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

impl WalletParams {
    /// Create empty filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given assets
    pub fn assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Filter by service
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set pagination
    pub fn page(mut self, offset: u32, limit: u32) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wallet_available() {
        let wallet: Wallet = serde_json::from_str(
            r#"{"id": 7, "asset": "USDT", "balance": "150.5", "frozen": "50.25", "service": "spot"}"#,
        )
        .unwrap();
        assert_eq!(wallet.available(), Some(dec!(100.25)));
    }

    #[test]
    fn test_wallet_params_builder() {
        let params = WalletParams::new().assets(["BTC", "ETH"]).service("spot");
        assert_eq!(params.assets, vec!["BTC".to_string(), "ETH".to_string()]);
        assert_eq!(params.service.as_deref(), Some("spot"));
        assert_eq!(params.offset, None);
    }
}
