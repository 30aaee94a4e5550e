//! Integration tests for token refresh and re-authentication

mod common;

use bitpin_rest::{AuthError, BitpinRestClient, RestError, TokenKind, TokenStatus};
use bitpin_types::WalletParams;
use common::*;
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTHENTICATE: &str = "/api/v1/usr/authenticate/";
const REFRESH: &str = "/api/v1/usr/refresh_token/";
const WALLETS: &str = "/api/v1/wlt/wallets/";

async fn expect_no_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(AUTHENTICATE))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

async fn expect_no_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

async fn mount_wallets(server: &MockServer, access: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(WALLETS))
        .and(header("authorization", format!("Bearer {}", access).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(wallets_body()))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_valid_tokens_are_sent_unchanged() {
    let server = MockServer::start().await;
    let access = valid_token("a1");
    let refresh = valid_token("r1");

    expect_no_login(&server).await;
    expect_no_refresh(&server).await;
    mount_wallets(&server, &access, 1).await;

    let client = client_with_tokens(&server, &access, &refresh);
    let wallets = client.get_wallets(&WalletParams::new()).await.unwrap();

    assert_eq!(wallets.len(), 2);
    assert_eq!(client.credentials().access_token(), access);
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_only() {
    let server = MockServer::start().await;
    let refresh = valid_token("r1");
    let new_access = valid_token("a2");

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(body_json(json!({"refresh": refresh})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": new_access})))
        .expect(1)
        .mount(&server)
        .await;
    expect_no_login(&server).await;
    mount_wallets(&server, &new_access, 1).await;

    let client = client_with_tokens(&server, &expired_token("a1"), &refresh);
    assert_eq!(client.token_status(), TokenStatus::AccessExpired);

    client.get_wallets(&WalletParams::new()).await.unwrap();

    assert_eq!(client.credentials().access_token(), new_access);
    assert_eq!(client.credentials().refresh_token(), refresh);
    assert_eq!(client.token_status(), TokenStatus::AccessValid);
}

#[tokio::test]
async fn test_expired_refresh_token_triggers_login() {
    let server = MockServer::start().await;
    let new_access = valid_token("a2");
    let new_refresh = valid_token("r2");

    Mock::given(method("POST"))
        .and(path(AUTHENTICATE))
        .and(body_json(json!({"api_key": API_KEY, "secret_key": SECRET_KEY})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": new_access, "refresh": new_refresh})),
        )
        .expect(1)
        .mount(&server)
        .await;
    expect_no_refresh(&server).await;
    mount_wallets(&server, &new_access, 1).await;

    let config = config_for(&server)
        .with_tokens(expired_token("a1"), expired_token("r1"))
        .with_api_keys(API_KEY, SECRET_KEY);
    let client = BitpinRestClient::with_config(config).unwrap();
    assert_eq!(client.token_status(), TokenStatus::RefreshExpired);

    client.get_wallets(&WalletParams::new()).await.unwrap();

    assert_eq!(client.credentials().access_token(), new_access);
    assert_eq!(client.credentials().refresh_token(), new_refresh);
}

#[tokio::test]
async fn test_expired_tokens_without_keys_fail_without_io() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, &expired_token("a1"), &expired_token("r1"));
    assert_eq!(client.token_status(), TokenStatus::NoCredentials);

    let err = client.get_wallets(&WalletParams::new()).await.unwrap_err();

    assert!(matches!(err, RestError::AuthenticationFailed(_)));
    assert_eq!(err.auth_error(), Some(&AuthError::MissingCredentials));
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_malformed_token_fails_without_io() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, "not-a-jwt", &valid_token("r1"));
    let err = client.get_wallets(&WalletParams::new()).await.unwrap_err();

    match err {
        RestError::AuthenticationFailed(inner) => match *inner {
            RestError::TokenDecodeFailed { kind, .. } => assert_eq!(kind, TokenKind::Access),
            other => panic!("unexpected inner error: {:?}", other),
        },
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_refresh_token_blocks_authenticated_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server)
        .with_tokens("opaque-access", "")
        .with_auto_refresh(false);
    let client = BitpinRestClient::with_config(config).unwrap();

    let err = client.get_wallets(&WalletParams::new()).await.unwrap_err();
    assert!(matches!(err, RestError::Auth(AuthError::MissingRefreshToken)));
}

#[tokio::test]
async fn test_unauthorized_response_is_not_retried() {
    let server = MockServer::start().await;
    let access = valid_token("a1");

    Mock::given(method("GET"))
        .and(path(WALLETS))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Given token not valid", "code": "token_not_valid"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    expect_no_refresh(&server).await;
    expect_no_login(&server).await;

    let client = client_with_tokens(&server, &access, &valid_token("r1"));
    let err = client.get_wallets(&WalletParams::new()).await.unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    let api = err.api_error().unwrap();
    assert_eq!(api.code(), Some("token_not_valid"));
    assert_eq!(client.credentials().access_token(), access);
}

#[tokio::test]
async fn test_failed_refresh_surfaces_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_tokens(&server, &expired_token("a1"), &valid_token("r1"));
    let err = client.get_wallets(&WalletParams::new()).await.unwrap_err();

    assert!(matches!(err, RestError::AuthenticationFailed(_)));
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.api_error().and_then(|e| e.detail()), Some("expired"));
}

#[tokio::test]
async fn test_concurrent_requests_refresh_once() {
    let server = MockServer::start().await;
    let new_access = valid_token("a2");

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": new_access})))
        .expect(1)
        .mount(&server)
        .await;
    mount_wallets(&server, &new_access, 2).await;

    let client = client_with_tokens(&server, &expired_token("a1"), &valid_token("r1"));
    let params = WalletParams::new();
    let (first, second) = tokio::join!(client.get_wallets(&params), client.get_wallets(&params));

    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_explicit_authenticate_replaces_tokens() {
    let server = MockServer::start().await;
    let access = valid_token("a9");
    let refresh = valid_token("r9");

    Mock::given(method("POST"))
        .and(path(AUTHENTICATE))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": access, "refresh": refresh})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = BitpinRestClient::with_config(config_for(&server)).unwrap();
    let response = client.authenticate(API_KEY, SECRET_KEY).await.unwrap();

    assert_eq!(response.access, access);
    assert!(client.is_authenticated());
    assert!(client.credentials().has_api_keys());
}

#[tokio::test]
async fn test_connect_logs_in_with_api_keys() {
    let server = MockServer::start().await;
    let access = valid_token("a1");
    let refresh = valid_token("r1");

    Mock::given(method("POST"))
        .and(path(AUTHENTICATE))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": access, "refresh": refresh})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = BitpinRestClient::connect(config_for(&server).with_api_keys(API_KEY, SECRET_KEY))
        .await
        .unwrap();

    assert_eq!(client.credentials().access_token(), access);
    assert_eq!(client.initial_tokens(), (None, None));
}

#[tokio::test]
async fn test_connect_refreshes_supplied_tokens() {
    let server = MockServer::start().await;
    let stale = expired_token("a1");
    let new_access = valid_token("a2");

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": new_access})))
        .expect(1)
        .mount(&server)
        .await;
    expect_no_login(&server).await;

    let config = config_for(&server)
        .with_tokens(stale.clone(), valid_token("r1"))
        .with_api_keys(API_KEY, SECRET_KEY);
    let client = BitpinRestClient::connect(config).await.unwrap();

    assert_eq!(client.credentials().access_token(), new_access);
    assert_eq!(client.initial_tokens().0, Some(stale.as_str()));
}

#[tokio::test]
async fn test_connect_with_valid_tokens_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server)
        .with_tokens(valid_token("a1"), valid_token("r1"))
        .with_api_keys(API_KEY, SECRET_KEY);
    let client = BitpinRestClient::connect(config).await.unwrap();

    assert_eq!(client.token_status(), TokenStatus::AccessValid);
}
