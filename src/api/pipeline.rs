//! Authenticated request pipeline.
//!
//! `send` runs a fixed sequence: attempt, and on a 401 refresh once, then retry once.
//! There is no recursion, so a request can never trigger a second refresh.

use std::sync::Arc;

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{join_endpoint, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::identity::SessionStore;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Login/register style calls: no bearer header, no refresh on 401.
    pub skip_auth: bool,
}

impl ApiRequest {
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None, skip_auth: false }
    }
    pub fn get<P: Into<String>>(path: P) -> Self { Self::new(Method::GET, path) }
    pub fn post<P: Into<String>>(path: P) -> Self { Self::new(Method::POST, path) }
    pub fn put<P: Into<String>>(path: P) -> Self { Self::new(Method::PUT, path) }
    pub fn delete<P: Into<String>>(path: P) -> Self { Self::new(Method::DELETE, path) }

    pub fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }
}

/// Cheaply cloneable handle; clones share the HTTP pool, the session and the refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    base: String,
    refresh_path: String,
    http: reqwest::Client,
    session: SessionStore,
    refresh_gate: Arc<tokio::sync::Mutex<()>>,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig, session: SessionStore) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nexus/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(cfg, session, http))
    }

    pub fn with_http(cfg: &ClientConfig, session: SessionStore, http: reqwest::Client) -> Self {
        Self {
            base: cfg.api_base.clone(),
            refresh_path: cfg.refresh_path.clone(),
            http,
            session,
            refresh_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn session(&self) -> &SessionStore { &self.session }

    pub fn base(&self) -> &str { &self.base }

    pub async fn send_json<T: DeserializeOwned>(&self, req: ApiRequest) -> ClientResult<T> {
        let val = self.send(req).await?;
        Ok(serde_json::from_value(val)?)
    }

    pub async fn send(&self, req: ApiRequest) -> ClientResult<Value> {
        let token = if req.skip_auth { None } else { self.session.access_token() };
        let resp = self.execute(&req, token.as_deref()).await?;
        if resp.status() != StatusCode::UNAUTHORIZED || req.skip_auth {
            return read_response(resp).await;
        }

        info!(path = %req.path, "401 received; attempting token refresh");
        match self.refresh_access_token(token.as_deref()).await? {
            Some(fresh) => {
                // A 401 here is final: surfaced as a request error, never refreshed again.
                let retry = self.execute(&req, Some(&fresh)).await?;
                read_response(retry).await
            }
            None => {
                warn!(path = %req.path, "token refresh failed; session expired");
                self.session.clear();
                Err(ClientError::SessionExpired)
            }
        }
    }

    async fn execute(&self, req: &ApiRequest, bearer: Option<&str>) -> ClientResult<reqwest::Response> {
        let url = join_endpoint(&self.base, &req.path)?;
        debug!(method = %req.method, path = %req.path, auth = bearer.is_some(), "api request");
        let mut rb = self.http.request(req.method.clone(), url).header(ACCEPT, HeaderValue::from_static("application/json"));
        if !req.query.is_empty() {
            rb = rb.query(&req.query);
        }
        if let Some(token) = bearer {
            rb = rb.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            rb = rb.header(CONTENT_TYPE, HeaderValue::from_static("application/json")).json(body);
        }
        Ok(rb.send().await?)
    }

    /// Returns the access token to retry with, or None when the session cannot be recovered.
    ///
    /// Refreshes are serialized; a caller that queued behind another refresh reuses its result
    /// instead of spending the refresh token a second time.
    async fn refresh_access_token(&self, stale: Option<&str>) -> ClientResult<Option<String>> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.session.access_token() {
            if stale != Some(current.as_str()) {
                debug!("access token already refreshed by a concurrent request");
                return Ok(Some(current));
            }
        }

        let Some(refresh) = self.session.refresh_token() else {
            debug!("no refresh token stored");
            return Ok(None);
        };

        let url = join_endpoint(&self.base, &self.refresh_path)?;
        let resp = match self.http.post(url).header(ACCEPT, HeaderValue::from_static("application/json")).bearer_auth(&refresh).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("refresh request failed: {}", e);
                return Ok(None);
            }
        };
        if !resp.status().is_success() {
            warn!(status = resp.status().as_u16(), "refresh rejected");
            return Ok(None);
        }
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        let Some(access) = body.get("access_token").and_then(|v| v.as_str()).filter(|s| !s.is_empty()) else {
            warn!("refresh response carried no access_token");
            return Ok(None);
        };
        let rotated = body.get("refresh_token").and_then(|v| v.as_str()).filter(|s| !s.is_empty()).map(|s| s.to_string());
        self.session.apply_refresh(access.to_string(), rotated)?;
        info!("access token refreshed");
        Ok(Some(access.to_string()))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base", &self.base).field("session", &self.session).finish()
    }
}

async fn read_response(resp: reqwest::Response) -> ClientResult<Value> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let message = error_message(status, &bytes);
        debug!(status = status.as_u16(), %message, "api error");
        return Err(ClientError::Request { status: status.as_u16(), message });
    }
    if status == StatusCode::NO_CONTENT || bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Server message from `message`, `msg` or `detail` (in that order), else the status text.
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(v) = serde_json::from_slice::<Value>(body) {
        for key in ["message", "msg", "detail"] {
            if let Some(m) = v.get(key).and_then(|x| x.as_str()).filter(|s| !s.is_empty()) {
                return m.to_string();
            }
        }
    }
    status.canonical_reason().map(|s| s.to_string()).unwrap_or_else(|| status.as_u16().to_string())
}
