//! Public market data types
//!
//! Prices and amounts arrive as strings to keep full precision; the helper
//! methods parse them into [`Decimal`] on demand.

use crate::enums::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A currency listed on the exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    /// Currency code (e.g., "BTC", "IRT")
    pub currency: String,
    /// Full name
    pub name: String,
    /// Whether the currency can currently be traded
    pub tradable: bool,
    /// Decimal precision supported for this currency
    pub precision: String,
}

/// A trading market (base/quote pair)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Market symbol (e.g., "BTC_USDT")
    pub symbol: String,
    /// Human-readable name
    pub name: String,
    /// Base asset
    pub base: String,
    /// Quote asset
    pub quote: String,
    /// Whether the market is open for trading
    pub tradable: bool,
    /// Decimal places allowed in prices
    pub price_precision: u32,
    /// Decimal places allowed in base amounts
    pub base_amount_precision: u32,
    /// Decimal places allowed in quote amounts
    pub quote_amount_precision: u32,
}

/// 24h ticker for a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Market symbol
    pub symbol: String,
    /// Last price
    pub price: String,
    /// Price change over the past 24 hours (percent)
    pub daily_change_price: f64,
    /// 24h low
    pub low: String,
    /// 24h high
    pub high: String,
    /// Unix timestamp (seconds) of the last update
    pub timestamp: f64,
}

impl Ticker {
    /// Get the last price
    pub fn last_price(&self) -> Option<Decimal> {
        self.price.parse().ok()
    }

    /// Get the 24h low
    pub fn low_price(&self) -> Option<Decimal> {
        self.low.parse().ok()
    }

    /// Get the 24h high
    pub fn high_price(&self) -> Option<Decimal> {
        self.high.parse().ok()
    }

    /// Get the 24h range (high - low)
    pub fn daily_range(&self) -> Option<Decimal> {
        Some(self.high_price()? - self.low_price()?)
    }
}

/// Order book snapshot
///
/// Each level is `[price, amount]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Ask levels, best first
    pub asks: Vec<Vec<String>>,
    /// Bid levels, best first
    pub bids: Vec<Vec<String>>,
}

impl OrderBook {
    /// Get the best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().and_then(|level| level.first()?.parse().ok())
    }

    /// Get the best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().and_then(|level| level.first()?.parse().ok())
    }

    /// Get the spread
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    /// Get the mid price (average of best bid and ask)
    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.best_ask()? + self.best_bid()?) / Decimal::TWO)
    }

    /// Parsed ask levels; malformed levels are skipped
    pub fn ask_levels(&self) -> Vec<(Decimal, Decimal)> {
        parse_levels(&self.asks)
    }

    /// Parsed bid levels; malformed levels are skipped
    pub fn bid_levels(&self) -> Vec<(Decimal, Decimal)> {
        parse_levels(&self.bids)
    }
}

fn parse_levels(levels: &[Vec<String>]) -> Vec<(Decimal, Decimal)> {
    levels
        .iter()
        .filter_map(|level| {
            let price = level.first()?.parse().ok()?;
            let amount = level.get(1)?.parse().ok()?;
            Some((price, amount))
        })
        .collect()
}

/// A public trade (match)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Trade identifier
    pub id: String,
    /// Execution price
    pub price: String,
    /// Base amount traded
    pub base_amount: String,
    /// Quote amount traded
    pub quote_amount: String,
    /// Taker side
    pub side: Side,
}

impl Trade {
    /// Get the execution price
    pub fn price_decimal(&self) -> Option<Decimal> {
        self.price.parse().ok()
    }

    /// Get the base amount
    pub fn base_amount_decimal(&self) -> Option<Decimal> {
        self.base_amount.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> OrderBook {
        serde_json::from_str(
            r#"{
                "asks": [["101.5", "2"], ["102", "1.25"]],
                "bids": [["100.5", "3"], ["bad"], ["99", "4"]]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_orderbook_best_prices() {
        let book = book();
        assert_eq!(book.best_ask(), Some(dec!(101.5)));
        assert_eq!(book.best_bid(), Some(dec!(100.5)));
        assert_eq!(book.spread(), Some(dec!(1.0)));
        assert_eq!(book.mid_price(), Some(dec!(101.0)));
    }

    #[test]
    fn test_orderbook_levels_skip_malformed() {
        let book = book();
        assert_eq!(book.ask_levels().len(), 2);
        assert_eq!(
            book.bid_levels(),
            vec![(dec!(100.5), dec!(3)), (dec!(99), dec!(4))]
        );
    }

    #[test]
    fn test_empty_orderbook() {
        let book = OrderBook {
            asks: vec![],
            bids: vec![],
        };
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.spread(), None);
    }

    #[test]
    fn test_ticker_parse() {
        let ticker: Ticker = serde_json::from_str(
            r#"{
                "symbol": "BTC_USDT",
                "price": "64000.5",
                "daily_change_price": -1.25,
                "low": "63000",
                "high": "65500",
                "timestamp": 1718000000.123
            }"#,
        )
        .unwrap();

        assert_eq!(ticker.last_price(), Some(dec!(64000.5)));
        assert_eq!(ticker.daily_range(), Some(dec!(2500)));
    }

    #[test]
    fn test_trade_parse() {
        let trade: Trade = serde_json::from_str(
            r#"{"id": "abc", "price": "10.5", "base_amount": "2", "quote_amount": "21", "side": "buy"}"#,
        )
        .unwrap();
        assert_eq!(trade.side, Side::Buy);
        assert_eq!(trade.price_decimal(), Some(dec!(10.5)));
        assert_eq!(trade.base_amount_decimal(), Some(dec!(2)));
    }
}
