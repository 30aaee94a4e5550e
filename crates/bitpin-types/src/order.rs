//! Order management types

use crate::enums::{OrderType, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order state used to filter for open orders
pub const ACTIVE_ORDER_STATE: &str = "active";

// ============================================================================
// Responses
// ============================================================================

/// Status and fill details of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatus {
    /// Order identifier
    pub id: u64,
    /// Market symbol
    pub symbol: String,
    /// Order type
    #[serde(rename = "type")]
    pub order_type: String,
    /// Order side
    pub side: Side,
    /// Base amount requested
    pub base_amount: String,
    /// Quote amount requested
    pub quote_amount: String,
    /// Limit price
    pub price: String,
    /// Stop price (stop-limit and OCO orders)
    pub stop_price: Option<String>,
    /// OCO target price
    pub oco_target_price: Option<String>,
    /// Client-provided identifier
    pub identifier: Option<String>,
    /// Order state (e.g., "active", "closed", "canceled")
    pub state: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Close time, if closed
    pub closed_at: Option<String>,
    /// Base amount filled so far
    pub dealed_base_amount: String,
    /// Quote amount filled so far
    pub dealed_quote_amount: String,
    /// Whether a cancel has been requested
    pub req_to_cancel: bool,
    /// Commission charged
    pub commission: String,
}

impl OrderStatus {
    /// Returns true if the order is still open
    pub fn is_active(&self) -> bool {
        self.state == ACTIVE_ORDER_STATE
    }

    /// Filled base amount
    pub fn filled_base(&self) -> Option<Decimal> {
        self.dealed_base_amount.parse().ok()
    }

    /// Fraction of the base amount that has been filled (0..=1)
    pub fn fill_ratio(&self) -> Option<Decimal> {
        let requested: Decimal = self.base_amount.parse().ok()?;
        if requested.is_zero() {
            return None;
        }
        Some(self.filled_base()? / requested)
    }
}

/// A fill belonging to the authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTrade {
    /// Trade identifier
    pub id: u64,
    /// Market symbol
    pub symbol: String,
    /// Base amount traded
    pub base_amount: String,
    /// Quote amount traded
    pub quote_amount: String,
    /// Execution price
    pub price: String,
    /// Execution time
    pub created_at: DateTime<Utc>,
    /// Commission charged
    pub commission: String,
    /// Side from the user's perspective
    pub side: Side,
    /// Currency the commission was charged in
    pub commission_currency: String,
    /// Originating order
    pub order_id: u64,
    /// Client-provided identifier of the originating order
    pub identifier: Option<String>,
}

impl UserTrade {
    /// Commission as a decimal
    pub fn commission_decimal(&self) -> Option<Decimal> {
        self.commission.parse().ok()
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Parameters for placing a new order
///
/// # Example
///
/// ```
/// use bitpin_types::{CreateOrderParams, Side};
/// use rust_decimal::Decimal;
///
/// let order = CreateOrderParams::limit("BTC_USDT", Side::Buy, Decimal::ONE, Decimal::from(60000))
///     .with_identifier("my-order-1");
/// assert!(order.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOrderParams {
    /// Market symbol
    pub symbol: String,
    /// Order type
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Order side
    pub side: Side,
    /// Base amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_amount: Option<Decimal>,
    /// Quote amount (market orders sized in quote currency)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_amount: Option<Decimal>,
    /// Limit price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Stop trigger price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
    /// OCO target price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oco_target_price: Option<Decimal>,
    /// Client-provided identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl CreateOrderParams {
    fn new(symbol: impl Into<String>, order_type: OrderType, side: Side) -> Self {
        Self {
            symbol: symbol.into(),
            order_type,
            side,
            base_amount: None,
            quote_amount: None,
            price: None,
            stop_price: None,
            oco_target_price: None,
            identifier: None,
        }
    }

    /// Limit order for `base_amount` at `price`
    pub fn limit(symbol: impl Into<String>, side: Side, base_amount: Decimal, price: Decimal) -> Self {
        let mut order = Self::new(symbol, OrderType::Limit, side);
        order.base_amount = Some(base_amount);
        order.price = Some(price);
        order
    }

    /// Market order sized in the base currency
    pub fn market(symbol: impl Into<String>, side: Side, base_amount: Decimal) -> Self {
        let mut order = Self::new(symbol, OrderType::Market, side);
        order.base_amount = Some(base_amount);
        order
    }

    /// Market order sized in the quote currency
    pub fn market_quote(symbol: impl Into<String>, side: Side, quote_amount: Decimal) -> Self {
        let mut order = Self::new(symbol, OrderType::Market, side);
        order.quote_amount = Some(quote_amount);
        order
    }

    /// Stop-limit order
    pub fn stop_limit(
        symbol: impl Into<String>,
        side: Side,
        base_amount: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        let mut order = Self::new(symbol, OrderType::StopLimit, side);
        order.base_amount = Some(base_amount);
        order.price = Some(price);
        order.stop_price = Some(stop_price);
        order
    }

    /// OCO order: limit at `price`, stop-limit at `stop_price`/`oco_target_price`
    pub fn oco(
        symbol: impl Into<String>,
        side: Side,
        base_amount: Decimal,
        price: Decimal,
        stop_price: Decimal,
        oco_target_price: Decimal,
    ) -> Self {
        let mut order = Self::stop_limit(symbol, side, base_amount, price, stop_price);
        order.order_type = OrderType::Oco;
        order.oco_target_price = Some(oco_target_price);
        order
    }

    /// Attach a client identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Check that the fields required by the order type are present
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.is_empty() {
            return Err("symbol is required".to_string());
        }
        if self.base_amount.is_none() && self.quote_amount.is_none() {
            return Err("either base_amount or quote_amount is required".to_string());
        }
        for amount in [self.base_amount, self.quote_amount].into_iter().flatten() {
            if amount <= Decimal::ZERO {
                return Err(format!("amount must be positive, got {}", amount));
            }
        }
        if self.order_type.requires_price() && self.price.is_none() {
            return Err(format!("{} orders require a price", self.order_type));
        }
        if self.order_type.requires_stop_price() && self.stop_price.is_none() {
            return Err(format!("{} orders require a stop_price", self.order_type));
        }
        if self.order_type == OrderType::Oco && self.oco_target_price.is_none() {
            return Err("oco orders require an oco_target_price".to_string());
        }
        Ok(())
    }
}

/// Filters for the order history endpoint
///
/// Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrdersHistoryParams {
    /// Market symbol
    pub symbol: Option<String>,
    /// Order side
    pub side: Option<Side>,
    /// Order state
    pub state: Option<String>,
    /// Order type
    #[serde(rename = "type")]
    pub order_type: Option<OrderType>,
    /// Client identifier
    pub identifier: Option<String>,
    /// Lower bound of the creation time
    pub start: Option<String>,
    /// Upper bound of the creation time
    pub end: Option<String>,
    /// Comma-separated order ids
    pub ids_in: Option<String>,
    /// Comma-separated client identifiers
    pub identifiers_in: Option<String>,
    /// Pagination offset
    pub offset: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

impl OrdersHistoryParams {
    /// Create empty filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by market symbol
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Filter by side
    pub fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    /// Filter by state
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Filter by order type
    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    /// Restrict to the given order ids
    pub fn ids(mut self, ids: &[u64]) -> Self {
        let joined: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        self.ids_in = Some(joined.join(","));
        self
    }

    /// Restrict to the given client identifiers
    pub fn identifiers(mut self, identifiers: &[&str]) -> Self {
        self.identifiers_in = Some(identifiers.join(","));
        self
    }

    /// Set pagination
    pub fn page(mut self, offset: u32, limit: u32) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}

/// Filters for the user fills endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserTradesParams {
    /// Market symbol
    pub symbol: Option<String>,
    /// Side
    pub side: Option<Side>,
    /// Pagination offset
    pub offset: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

impl UserTradesParams {
    /// Create empty filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by market symbol
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Filter by side
    pub fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    /// Set pagination
    pub fn page(mut self, offset: u32, limit: u32) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}
