mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use nexus::api::{ApiClient, ApiRequest, PollsApi};
use nexus::identity::{SessionStatus, SessionStore};
use nexus::storage::{MemoryTokenStore, TokenPair, TokenStore};
use nexus::ClientError;

fn client_with(server: &common::Server, tokens: Arc<MemoryTokenStore>) -> ApiClient {
    let tmp = std::env::temp_dir().join("nexus-unused-tokens.json");
    let cfg = server.config(tmp);
    ApiClient::new(&cfg, SessionStore::new(tokens)).unwrap()
}

#[tokio::test]
async fn no_authorization_header_without_a_token() {
    let server = common::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let client = client_with(&server, tokens);

    let err = PollsApi::new(client.clone()).list(None).await.unwrap_err();
    // no refresh token either, so the 401 ends the session
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(err.message(), "Session expired");
    assert_eq!(server.mock.list_auth.lock().as_slice(), &[None]);
    assert_eq!(server.mock.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_retried_once() {
    let server = common::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("stale", Some(common::REFRESH.to_string()))));
    let client = client_with(&server, tokens.clone());

    let polls = PollsApi::new(client.clone()).list(None).await.unwrap();
    assert_eq!(polls.len(), 3);
    assert_eq!(server.mock.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        server.mock.list_auth.lock().as_slice(),
        &[Some("Bearer stale".to_string()), Some("Bearer access-2".to_string())]
    );

    // new access token persisted, refresh token kept
    let stored = tokens.load();
    assert_eq!(stored.access_token.as_deref(), Some("access-2"));
    assert_eq!(stored.refresh_token.as_deref(), Some(common::REFRESH));
    assert_eq!(client.session().access_token().as_deref(), Some("access-2"));
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let server = common::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("stale", Some(common::REFRESH.to_string()))));
    let client = client_with(&server, tokens);
    let polls = PollsApi::new(client);

    let (a, b) = tokio::join!(polls.list(None), polls.list(None));
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(server.mock.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_refresh_clears_everything() {
    let server = common::start().await;
    server.mock.refresh_ok.store(false, Ordering::SeqCst);
    let tokens = Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("stale", Some(common::REFRESH.to_string()))));
    let client = client_with(&server, tokens.clone());
    let mut status = client.session().subscribe();

    let err = PollsApi::new(client.clone()).list(None).await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(tokens.load().is_empty());
    assert_eq!(client.session().status(), SessionStatus::Unauthenticated);
    assert!(status.has_changed().unwrap());
    assert_eq!(*status.borrow_and_update(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn unauthorized_retry_is_final() {
    let server = common::start().await;
    server.mock.reject_all.store(true, Ordering::SeqCst);
    let tokens = Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("stale", Some(common::REFRESH.to_string()))));
    let client = client_with(&server, tokens.clone());

    let err = PollsApi::new(client.clone()).list(None).await.unwrap_err();
    assert!(matches!(err, ClientError::Request { status: 401, .. }), "{:?}", err);
    assert_eq!(err.message(), "Token expired");
    assert_eq!(server.mock.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.mock.list_auth.lock().len(), 2);

    // the refreshed session survives; only the request failed
    let stored = tokens.load();
    assert_eq!(stored.access_token.as_deref(), Some("access-2"));
    assert_eq!(stored.refresh_token.as_deref(), Some(common::REFRESH));
    assert_eq!(client.session().access_token().as_deref(), Some("access-2"));
}

#[tokio::test]
async fn refresh_connection_failure_expires_the_session() {
    let server = common::start_hangup().await;
    let tokens = Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("stale", Some(common::REFRESH.to_string()))));
    let cfg = nexus::ClientConfig::new(&server.base).unwrap();
    let client = ApiClient::new(&cfg, SessionStore::new(tokens.clone())).unwrap();

    let err = PollsApi::new(client.clone()).list(None).await.unwrap_err();
    assert!(err.is_session_expired(), "{:?}", err);
    assert!(tokens.load().is_empty());
    assert_eq!(client.session().status(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn skip_auth_requests_never_refresh() {
    let server = common::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("stale", Some(common::REFRESH.to_string()))));
    let client = client_with(&server, tokens.clone());

    let err = client.send(ApiRequest::get("/polls/").skip_auth()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.message(), "Token expired");
    assert_eq!(server.mock.refresh_calls.load(Ordering::SeqCst), 0);
    assert_eq!(tokens.load().access_token.as_deref(), Some("stale"));
}

#[tokio::test]
async fn no_content_resolves_to_empty_object() {
    let server = common::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("access-1", None)));
    let client = client_with(&server, tokens);

    let v = client.send(ApiRequest::delete("/polls/p-1")).await.unwrap();
    assert_eq!(v, serde_json::json!({}));
    let msg = PollsApi::new(client).delete("p-1").await.unwrap();
    assert_eq!(msg, "");
}

#[tokio::test]
async fn polls_are_normalized() {
    let server = common::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("access-1", None)));
    let polls = PollsApi::new(client_with(&server, tokens));

    let p = polls.get("p-1").await.unwrap();
    assert_eq!(p.status.as_str(), "active");
    assert_eq!(p.options[0].option_text, "Yes");
    assert_eq!(p.created_by.as_deref(), Some("u-9"));
    assert_eq!(p.closed_at, None);

    let results = polls.results("p-1").await.unwrap();
    assert_eq!(results.results[1].option_text, "Yes");
    assert_eq!(results.total_votes, 3);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // bind then drop to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let cfg = nexus::ClientConfig::new(&format!("http://127.0.0.1:{}/api", port)).unwrap();
    let client = ApiClient::new(&cfg, SessionStore::new(Arc::new(MemoryTokenStore::new()))).unwrap();

    let err = client.send(ApiRequest::get("/polls/")).await.unwrap_err();
    assert_eq!(err.code_str(), "network");
    assert!(err.status().is_none());
}
