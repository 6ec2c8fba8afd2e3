use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ClientResult;
use crate::storage::{TokenPair, TokenStore};

use super::user::User;

/// In-memory session. `user` is only ever set while `access_token` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No access token.
    Unauthenticated,
    /// Token present, identity not yet confirmed.
    Authenticating,
    /// Token and user both present.
    Authenticated,
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        match (&self.access_token, &self.user) {
            (None, _) => SessionStatus::Unauthenticated,
            (Some(_), None) => SessionStatus::Authenticating,
            (Some(_), Some(_)) => SessionStatus::Authenticated,
        }
    }
}

/// Explicit, cloneable state container for the current session.
///
/// Every mutation that touches tokens writes through to the `TokenStore` before the
/// in-memory copy changes, so a crash never leaves memory ahead of disk.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
    tokens: Arc<dyn TokenStore>,
    status_tx: Arc<watch::Sender<SessionStatus>>,
}

impl SessionStore {
    /// Builds the store and rehydrates tokens from durable storage.
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let stored = tokens.load();
        let session = Session { access_token: stored.access_token, refresh_token: stored.refresh_token, user: None };
        let (status_tx, _) = watch::channel(session.status());
        debug!(status = ?session.status(), "session rehydrated");
        Self { inner: Arc::new(RwLock::new(session)), tokens, status_tx: Arc::new(status_tx) }
    }

    pub fn snapshot(&self) -> Session { self.inner.read().clone() }

    pub fn status(&self) -> SessionStatus { self.inner.read().status() }

    pub fn access_token(&self) -> Option<String> { self.inner.read().access_token.clone() }

    pub fn refresh_token(&self) -> Option<String> { self.inner.read().refresh_token.clone() }

    pub fn user(&self) -> Option<User> { self.inner.read().user.clone() }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> { self.status_tx.subscribe() }

    fn publish(&self) {
        let status = self.status();
        self.status_tx.send_if_modified(|cur| {
            if *cur != status { *cur = status; true } else { false }
        });
    }

    /// Replaces both tokens. The user is kept; callers replacing the identity use `establish`.
    pub fn set_tokens(&self, pair: TokenPair) -> ClientResult<()> {
        self.tokens.save(&pair)?;
        {
            let mut s = self.inner.write();
            s.access_token = Some(pair.access_token);
            s.refresh_token = pair.refresh_token;
        }
        self.publish();
        Ok(())
    }

    /// Stores tokens for an identity that is not confirmed yet. Any previous user is dropped.
    pub fn begin(&self, pair: TokenPair) -> ClientResult<()> {
        self.tokens.save(&pair)?;
        {
            let mut s = self.inner.write();
            *s = Session { access_token: Some(pair.access_token), refresh_token: pair.refresh_token, user: None };
        }
        self.publish();
        Ok(())
    }

    /// Stores a freshly minted access token. The refresh token rotates only when a new one is supplied.
    pub fn apply_refresh(&self, access_token: String, rotated_refresh: Option<String>) -> ClientResult<()> {
        let refresh = rotated_refresh.or_else(|| self.refresh_token());
        self.set_tokens(TokenPair { access_token, refresh_token: refresh })
    }

    /// Sets the current user. Refused (returns false) when no access token is present.
    pub fn set_user(&self, user: User) -> bool {
        {
            let mut s = self.inner.write();
            if s.access_token.is_none() {
                warn!(user_id = %user.id, "refusing to set user without an access token");
                return false;
            }
            s.user = Some(user);
        }
        self.publish();
        true
    }

    /// Login: tokens and user replaced together.
    pub fn establish(&self, pair: TokenPair, user: User) -> ClientResult<()> {
        self.tokens.save(&pair)?;
        {
            let mut s = self.inner.write();
            *s = Session { access_token: Some(pair.access_token), refresh_token: pair.refresh_token, user: Some(user) };
        }
        self.publish();
        Ok(())
    }

    /// Drops tokens and user from memory and storage. Storage failures are logged, never returned.
    pub fn clear(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!("failed to clear stored tokens: {}", e);
        }
        *self.inner.write() = Session::default();
        info!("session cleared");
        self.publish();
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("status", &self.status()).finish()
    }
}
