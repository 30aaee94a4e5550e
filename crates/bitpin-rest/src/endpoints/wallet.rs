//! Wallet endpoints
//!
//! These endpoints require authentication.

use crate::error::RestResult;
use crate::pipeline::{ApiRequest, RequestPipeline};
use bitpin_types::{Wallet, WalletParams};
use tracing::{debug, instrument};

/// Wallet balance endpoints
pub struct WalletEndpoints<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> WalletEndpoints<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// List wallets, optionally filtered by asset and service
    #[instrument(skip(self, params))]
    pub async fn get_wallets(&self, params: &WalletParams) -> RestResult<Vec<Wallet>> {
        debug!(assets = params.assets.len(), "Fetching wallets");
        self.pipeline
            .execute(
                ApiRequest::get("/wlt/wallets/")
                    .with_body(params)
                    .authenticated(),
            )
            .await
    }
}
