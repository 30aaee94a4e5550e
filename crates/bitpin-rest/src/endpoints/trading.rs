//! Trading endpoints for order management
//!
//! These endpoints require authentication.

use crate::error::{RestError, RestResult};
use crate::pipeline::{ApiRequest, RequestPipeline};
use bitpin_types::{
    CreateOrderParams, OrderStatus, OrdersHistoryParams, UserTrade, UserTradesParams,
    ACTIVE_ORDER_STATE,
};
use tracing::{debug, info, instrument};

const ORDERS_PATH: &str = "/odr/orders/";
const FILLS_PATH: &str = "/odr/fills/";

/// Trading endpoints for order management
pub struct TradingEndpoints<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> TradingEndpoints<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// Place a new order
    ///
    /// The order is validated locally first; an invalid order is rejected
    /// without a request being sent.
    #[instrument(skip(self, order), fields(symbol = %order.symbol, side = %order.side, order_type = %order.order_type))]
    pub async fn create_order(&self, order: &CreateOrderParams) -> RestResult<OrderStatus> {
        order.validate().map_err(RestError::InvalidParameter)?;

        let status: OrderStatus = self
            .pipeline
            .execute(ApiRequest::post(ORDERS_PATH).with_body(order).authenticated())
            .await?;

        info!(order_id = status.id, "Order placed");
        Ok(status)
    }

    /// Cancel an order by id
    ///
    /// The response body is ignored.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: u64) -> RestResult<()> {
        self.pipeline
            .execute_unit(ApiRequest::delete(format!("{}{}/", ORDERS_PATH, order_id)).authenticated())
            .await?;

        info!("Order canceled");
        Ok(())
    }

    /// Order history matching the given filters
    #[instrument(skip(self, params))]
    pub async fn get_orders_history(
        &self,
        params: &OrdersHistoryParams,
    ) -> RestResult<Vec<OrderStatus>> {
        debug!("Fetching order history");
        self.pipeline
            .execute(ApiRequest::get(ORDERS_PATH).with_body(params).authenticated())
            .await
    }

    /// Open orders matching the given filters
    ///
    /// Same as [`get_orders_history`](Self::get_orders_history) with the
    /// state filter forced to `active`. A `state` set on `params` is ignored.
    #[instrument(skip(self, params))]
    pub async fn get_open_orders(&self, params: &OrdersHistoryParams) -> RestResult<Vec<OrderStatus>> {
        let params = params.clone().state(ACTIVE_ORDER_STATE);
        debug!("Fetching open orders");
        self.pipeline
            .execute(ApiRequest::get(ORDERS_PATH).with_body(&params).authenticated())
            .await
    }

    /// Status of specific orders, looked up by id
    #[instrument(skip(self))]
    pub async fn get_order_statuses(&self, order_ids: &[u64]) -> RestResult<Vec<OrderStatus>> {
        if order_ids.is_empty() {
            return Err(RestError::InvalidParameter(
                "at least one order id is required".to_string(),
            ));
        }

        let ids: Vec<String> = order_ids.iter().map(|id| id.to_string()).collect();
        debug!(count = ids.len(), "Fetching order statuses");
        self.pipeline
            .execute(ApiRequest::get(format!("{}{}/", ORDERS_PATH, ids.join(","))).authenticated())
            .await
    }

    /// Fills of the authenticated user
    #[instrument(skip(self, params))]
    pub async fn get_user_trades(&self, params: &UserTradesParams) -> RestResult<Vec<UserTrade>> {
        debug!("Fetching user trades");
        self.pipeline
            .execute(ApiRequest::get(FILLS_PATH).with_body(params).authenticated())
            .await
    }
}
