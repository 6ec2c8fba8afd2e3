//! In-process mock of the polling API, served under `/api` on an ephemeral localhost port.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::task::JoinHandle;

use nexus::config::ClientConfig;

pub const PASSWORD: &str = "secret1";
pub const REFRESH: &str = "refresh-1";

pub struct Mock {
    /// The one access token the server currently accepts.
    pub valid_access: Mutex<String>,
    /// Role of whoever logged in last.
    pub role: Mutex<String>,
    pub refresh_ok: AtomicBool,
    /// `/polls/` answers 401 whatever token it gets.
    pub reject_all: AtomicBool,
    /// Login responses carry tokens only; clients must call `/auth/me`.
    pub omit_user: AtomicBool,
    pub me_fails: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    /// Authorization header of every `/polls/` list request.
    pub list_auth: Mutex<Vec<Option<String>>>,
}

impl Default for Mock {
    fn default() -> Self {
        Self {
            valid_access: Mutex::new("access-1".into()),
            role: Mutex::new("VOTER".into()),
            refresh_ok: AtomicBool::new(true),
            reject_all: AtomicBool::new(false),
            omit_user: AtomicBool::new(false),
            me_fails: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            list_auth: Mutex::new(Vec::new()),
        }
    }
}

pub struct Server {
    pub mock: Arc<Mock>,
    pub base: String,
    handle: JoinHandle<()>,
}

impl Drop for Server {
    fn drop(&mut self) { self.handle.abort(); }
}

impl Server {
    pub fn config(&self, token_file: std::path::PathBuf) -> ClientConfig {
        ClientConfig::new(&self.base).unwrap().with_token_file(token_file)
    }
}

pub async fn start() -> Server {
    let mock = Arc::new(Mock::default());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/polls/", get(list_polls))
        .route("/api/polls/voter/active", get(voter_active))
        .route("/api/polls/closed", get(closed_results))
        .route("/api/polls/{id}", get(get_poll).put(update_poll).delete(delete_poll))
        .route("/api/polls/{id}/results", get(results))
        .route("/api/polls/{id}/vote", post(vote))
        .route("/api/polls/{id}/vote/status", get(vote_status))
        .route("/api/admin/metrics", get(metrics))
        .route("/api/admin/audit-logs", get(audit_logs))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock server error: {e:?}");
        }
    });
    Server { mock, base: format!("http://127.0.0.1:{}/api", port), handle }
}

/// Bare TCP server: every request gets a 401, except the refresh endpoint, whose connection
/// is closed before any response is written.
pub struct Hangup {
    pub base: String,
    handle: JoinHandle<()>,
}

impl Drop for Hangup {
    fn drop(&mut self) { self.handle.abort(); }
}

pub async fn start_hangup() -> Hangup {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                if head.lines().next().is_some_and(|l| l.contains("/auth/refresh")) {
                    return;
                }
                let body = r#"{"detail":"Token expired"}"#;
                let resp = format!(
                    "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    Hangup { base: format!("http://127.0.0.1:{}/api", port), handle }
}

type Shared = State<Arc<Mock>>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

fn authorized(m: &Mock, headers: &HeaderMap) -> bool { bearer(headers).as_deref() == Some(m.valid_access.lock().as_str()) }

fn unauthorized() -> Response { (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Token expired" }))).into_response() }

fn user_json(m: &Mock) -> Value {
    let role = m.role.lock().clone();
    json!({ "id": "u-1", "email": format!("{}@example.com", role.to_lowercase()), "role": role, "username": null })
}

fn poll_json(id: &str) -> Value {
    json!({
        "id": id, "title": "Lunch?", "description": "Friday team lunch", "status": "ACTIVE",
        "options": [{ "id": "o-yes", "text": "Yes", "vote_count": 2 }, { "id": "o-no", "text": "No", "vote_count": 1 }],
        "created_at": "2025-03-01T10:00:00Z", "closed_at": null, "owner_id": "u-9"
    })
}

async fn login(State(m): Shared, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))).into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    let role = match email.split('@').next().unwrap_or_default() {
        "admin" => "SYSTEM_ADMIN",
        "pa" => "POLL_ADMIN",
        _ => "VOTER",
    };
    *m.role.lock() = role.to_string();
    *m.valid_access.lock() = "access-1".into();
    if m.omit_user.load(Ordering::SeqCst) {
        return Json(json!({ "access_token": "access-1", "refresh_token": REFRESH })).into_response();
    }
    Json(json!({ "access_token": "access-1", "refresh_token": REFRESH, "user": user_json(&m) })).into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["role"] == "SYSTEM_ADMIN" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "msg": "Role not allowed" }))).into_response();
    }
    (StatusCode::CREATED, Json(json!({ "message": "Registration successful", "user": null }))).into_response()
}

async fn refresh(State(m): Shared, headers: HeaderMap) -> Response {
    m.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // let concurrent callers pile up behind the refresh
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    if !m.refresh_ok.load(Ordering::SeqCst) || bearer(&headers).as_deref() != Some(REFRESH) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Refresh token invalid" }))).into_response();
    }
    *m.valid_access.lock() = "access-2".into();
    Json(json!({ "access_token": "access-2" })).into_response()
}

async fn logout(State(m): Shared) -> Response {
    m.logout_calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn me(State(m): Shared, headers: HeaderMap) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    if m.me_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "Profile service unavailable" }))).into_response();
    }
    Json(json!({ "user": user_json(&m) })).into_response()
}

async fn list_polls(State(m): Shared, headers: HeaderMap) -> Response {
    m.list_auth.lock().push(headers.get("authorization").and_then(|v| v.to_str().ok()).map(|s| s.to_string()));
    if m.reject_all.load(Ordering::SeqCst) || !authorized(&m, &headers) {
        return unauthorized();
    }
    let mut draft = poll_json("p-2");
    draft["status"] = json!("DRAFT");
    let mut closed = poll_json("p-3");
    closed["status"] = json!("CLOSED");
    Json(json!({ "polls": [poll_json("p-1"), draft, closed] })).into_response()
}

async fn get_poll(State(m): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    Json(poll_json(&id)).into_response()
}

/// Echoes the submitted draft back as a poll.
async fn update_poll(State(m): Shared, headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    let mut poll = poll_json(&id);
    poll["title"] = body["title"].clone();
    poll["description"] = body.get("description").cloned().unwrap_or(Value::Null);
    let options: Vec<Value> = body["options"]
        .as_array()
        .map(|opts| opts.iter().enumerate().map(|(i, o)| json!({ "id": format!("o-{}", i + 1), "text": o["text"] })).collect())
        .unwrap_or_default();
    poll["options"] = Value::Array(options);
    Json(json!({ "poll": poll })).into_response()
}

async fn voter_active(State(m): Shared, headers: HeaderMap) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    Json(json!([poll_json("p-1")])).into_response()
}

async fn closed_results(State(m): Shared, headers: HeaderMap) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    Json(json!({
        "count": 1,
        "polls": [{
            "poll_id": 3, "title": "Offsite?", "status": "CLOSED", "closed_at": "2025-02-10T09:00:00Z", "total_votes": 4,
            "results": [{ "option_id": 31, "text": "Lisbon", "votes": 3 }, { "option_id": 32, "text": "Porto", "votes": 1 }]
        }]
    }))
    .into_response()
}

async fn delete_poll(State(m): Shared, headers: HeaderMap) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn results(State(m): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    Json(json!({
        "poll_id": id, "total_votes": 3, "status": "CLOSED",
        "results": [
            { "option_id": "o-no", "text": "No", "votes": 1 },
            { "option_id": "o-yes", "text": "Yes", "votes": 2 }
        ]
    }))
    .into_response()
}

async fn vote(State(m): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    if body["option_id"] != "o-yes" && body["option_id"] != "o-no" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid option" }))).into_response();
    }
    (StatusCode::CREATED, Json(json!({ "message": "Vote recorded", "vote_id": "abcdef987654" }))).into_response()
}

async fn vote_status(State(m): Shared, headers: HeaderMap) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    Json(json!({ "has_voted": false })).into_response()
}

async fn metrics(State(m): Shared, headers: HeaderMap) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    Json(json!({
        "users": { "total": 12 },
        "polls": { "total": 3, "active": 1, "closed": 1, "draft": 1 },
        "votes": { "total": 9 },
        "audit": { "events_last_24h": 4 }
    }))
    .into_response()
}

async fn audit_logs(State(m): Shared, headers: HeaderMap) -> Response {
    if !authorized(&m, &headers) {
        return unauthorized();
    }
    Json(json!({
        "logs": [
            { "id": 1, "actor_user_id": "u-1", "action": "POLL_VOTE", "entity_type": "POLL", "entity_id": "p-1aaaaaaa", "created_at": "2025-03-01T14:05:09Z" },
            { "id": 2, "actor_user_id": "u-2", "action": "AUTH_FAILURE", "entity_type": "AUTH", "created_at": "2025-03-01T15:00:00Z" }
        ],
        "total": 2, "limit": 20, "offset": 0
    }))
    .into_response()
}
