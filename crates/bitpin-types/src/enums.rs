//! Side and OrderType enums

use serde::{Deserialize, Serialize};

/// Trade or order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

impl Side {
    /// Returns the side as used in API messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order types accepted by the order endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Executes immediately at the best available price
    Market,
    /// Executes at the given price or better
    Limit,
    /// Places a limit order once the stop price is reached
    StopLimit,
    /// One-cancels-the-other pair of a limit and a stop-limit order
    Oco,
}

impl OrderType {
    /// Returns the order type as used in API messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::StopLimit => "stop_limit",
            Self::Oco => "oco",
        }
    }

    /// Returns true if this order type needs a limit price
    pub fn requires_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit | Self::Oco)
    }

    /// Returns true if this order type needs a stop price
    pub fn requires_stop_price(&self) -> bool {
        matches!(self, Self::StopLimit | Self::Oco)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), r#""buy""#);
        let side: Side = serde_json::from_str(r#""sell""#).unwrap();
        assert_eq!(side, Side::Sell);
        assert_eq!(side.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderType::StopLimit).unwrap(),
            r#""stop_limit""#
        );
        assert_eq!(OrderType::StopLimit.to_string(), "stop_limit");
        let parsed: OrderType = serde_json::from_str(r#""oco""#).unwrap();
        assert_eq!(parsed, OrderType::Oco);
    }

    #[test]
    fn test_order_type_requirements() {
        assert!(!OrderType::Market.requires_price());
        assert!(OrderType::Limit.requires_price());
        assert!(!OrderType::Limit.requires_stop_price());
        assert!(OrderType::Oco.requires_stop_price());
    }
}
