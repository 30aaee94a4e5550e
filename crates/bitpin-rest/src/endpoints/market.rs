//! Public market data endpoints
//!
//! These endpoints don't require authentication.

use super::validate_symbol;
use crate::error::RestResult;
use crate::pipeline::{ApiRequest, RequestPipeline};
use bitpin_types::{Currency, Market, OrderBook, Ticker, Trade};
use tracing::{debug, instrument};

/// Public market data endpoints
pub struct MarketEndpoints<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> MarketEndpoints<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// List supported currencies
    #[instrument(skip(self))]
    pub async fn get_currencies(&self) -> RestResult<Vec<Currency>> {
        debug!("Fetching currencies");
        self.pipeline.execute(ApiRequest::get("/mkt/currencies/")).await
    }

    /// List markets with their precisions
    #[instrument(skip(self))]
    pub async fn get_markets(&self) -> RestResult<Vec<Market>> {
        debug!("Fetching markets");
        self.pipeline.execute(ApiRequest::get("/mkt/markets/")).await
    }

    /// Latest ticker for every market
    #[instrument(skip(self))]
    pub async fn get_tickers(&self) -> RestResult<Vec<Ticker>> {
        debug!("Fetching tickers");
        self.pipeline.execute(ApiRequest::get("/mkt/tickers/")).await
    }

    /// Order book snapshot
    ///
    /// # Arguments
    /// * `symbol` - Market symbol (e.g., "BTC_USDT")
    #[instrument(skip(self))]
    pub async fn get_order_book(&self, symbol: &str) -> RestResult<OrderBook> {
        validate_symbol(symbol)?;
        debug!("Fetching order book");
        self.pipeline
            .execute(ApiRequest::get(format!("/mth/orderbook/{}/", symbol)))
            .await
    }

    /// Most recent public trades
    ///
    /// # Arguments
    /// * `symbol` - Market symbol (e.g., "BTC_USDT")
    #[instrument(skip(self))]
    pub async fn get_recent_trades(&self, symbol: &str) -> RestResult<Vec<Trade>> {
        validate_symbol(symbol)?;
        debug!("Fetching recent trades");
        self.pipeline
            .execute(ApiRequest::get(format!("/mth/matches/{}/", symbol)))
            .await
    }
}
