//! Common test utilities and fixtures for integration tests
//!
//! Tokens built here are unsigned; the client never verifies signatures.

#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use bitpin_rest::{BitpinRestClient, ClientConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_KEY: &str = "test-api-key";
pub const SECRET_KEY: &str = "test-secret-key";

/// Build a token whose `exp` claim is `secs` from now (negative for the past)
pub fn token_expiring_in(secs: i64, jti: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({
        "token_type": "access",
        "exp": chrono::Utc::now().timestamp() + secs,
        "jti": jti,
        "user_id": 1001,
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.test-signature", header, payload)
}

pub fn valid_token(jti: &str) -> String {
    token_expiring_in(3600, jti)
}

pub fn expired_token(jti: &str) -> String {
    token_expiring_in(-3600, jti)
}

/// Configuration pointing at the mock server
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new().with_base_url(server.uri()).with_timeout(5)
}

/// Client holding the given tokens and no API keys
pub fn client_with_tokens(server: &MockServer, access: &str, refresh: &str) -> BitpinRestClient {
    BitpinRestClient::with_config(config_for(server).with_tokens(access, refresh))
        .expect("client should build")
}

/// Sample wallet listing
pub fn wallets_body() -> Value {
    json!([
        {"id": 1, "asset": "BTC", "balance": "0.75", "frozen": "0.25", "service": "spot"},
        {"id": 2, "asset": "ETH", "balance": "3", "frozen": "0", "service": "spot"}
    ])
}

/// Sample market listing
pub fn markets_body() -> Value {
    json!([{
        "symbol": "BTC_USDT",
        "name": "Bitcoin/Tether",
        "base": "BTC",
        "quote": "USDT",
        "tradable": true,
        "price_precision": 2,
        "base_amount_precision": 6,
        "quote_amount_precision": 2
    }])
}

/// Sample order status
pub fn order_body(id: u64, state: &str) -> Value {
    json!({
        "id": id,
        "symbol": "BTC_USDT",
        "type": "limit",
        "side": "buy",
        "base_amount": "0.5",
        "quote_amount": "30000",
        "price": "60000",
        "stop_price": null,
        "oco_target_price": null,
        "identifier": null,
        "state": state,
        "created_at": "2024-06-01T12:00:00Z",
        "closed_at": null,
        "dealed_base_amount": "0",
        "dealed_quote_amount": "0",
        "req_to_cancel": false,
        "commission": "0"
    })
}
