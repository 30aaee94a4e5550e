//! API endpoint implementations

pub mod market;
pub mod trading;
pub mod wallet;

pub use market::MarketEndpoints;
pub use trading::TradingEndpoints;
pub use wallet::WalletEndpoints;

use crate::error::{RestError, RestResult};

/// Reject symbols that would change the shape of a path
pub(crate) fn validate_symbol(symbol: &str) -> RestResult<()> {
    if symbol.is_empty() {
        return Err(RestError::InvalidParameter("symbol must not be empty".to_string()));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(RestError::InvalidParameter(format!(
            "invalid symbol: {}",
            symbol
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_symbol() {
        assert!(validate_symbol("BTC_USDT").is_ok());
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("BTC/USDT").is_err());
        assert!(validate_symbol("BTC_USDT/../x").is_err());
    }
}
