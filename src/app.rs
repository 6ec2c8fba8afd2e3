//! Application context: one explicit container for config, session and API handles,
//! plus the current route and guarded navigation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{AdminApi, ApiClient, PollsApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::identity::{check_route, AuthService, GuardDecision, SessionStatus, SessionStore};
use crate::router::{Route, LANDING};
use crate::storage::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Guard redirects chain at most this many times.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug)]
pub struct App {
    config: ClientConfig,
    session: SessionStore,
    auth: AuthService,
    polls: PollsApi,
    admin: AdminApi,
    current: Route,
}

impl App {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let session = SessionStore::new(tokens);
        let client = ApiClient::new(&config, session)?;
        Ok(Self::from_client(config, client))
    }

    /// File-backed tokens, or in-memory ones when `ephemeral`.
    pub fn from_config(config: ClientConfig, ephemeral: bool) -> ClientResult<Self> {
        let tokens: Arc<dyn TokenStore> = if ephemeral {
            Arc::new(MemoryTokenStore::new())
        } else {
            Arc::new(FileTokenStore::new(config.token_file.clone()))
        };
        Self::new(config, tokens)
    }

    pub fn from_client(config: ClientConfig, client: ApiClient) -> Self {
        App {
            session: client.session().clone(),
            auth: AuthService::new(client.clone()),
            polls: PollsApi::new(client.clone()),
            admin: AdminApi::new(client),
            config,
            current: Route::Login,
        }
    }

    pub fn config(&self) -> &ClientConfig { &self.config }
    pub fn session(&self) -> &SessionStore { &self.session }
    pub fn auth(&self) -> &AuthService { &self.auth }
    pub fn polls(&self) -> &PollsApi { &self.polls }
    pub fn admin(&self) -> &AdminApi { &self.admin }
    pub fn current(&self) -> &Route { &self.current }

    /// Resolve a stored session (if any) and land on the first route.
    pub async fn start(&mut self) -> SessionStatus {
        let status = self.auth.hydrate().await;
        info!(?status, "session hydrated");
        let first = if status == SessionStatus::Authenticated { LANDING } else { Route::Login };
        self.go(first);
        status
    }

    pub fn navigate(&mut self, path: &str) -> Route { self.go(Route::parse(path)) }

    /// Walk guard redirects from `route` and make the final route current.
    pub fn go(&mut self, route: Route) -> Route {
        let session = self.session.snapshot();
        let mut target = route;
        for _ in 0..MAX_REDIRECTS {
            match check_route(&session, &target) {
                GuardDecision::Render => break,
                GuardDecision::Redirect(next) => {
                    debug!(from = %target, to = %next, "guard redirect");
                    target = next;
                }
            }
        }
        self.current = target.clone();
        target
    }

    /// Routes a session-expired failure back to login.
    pub fn handle_error(&mut self, err: &ClientError) -> Option<Route> {
        if err.is_session_expired() {
            return Some(self.go(Route::Login));
        }
        None
    }

    /// Re-check the current route after the session changed underneath it.
    pub fn revalidate(&mut self) -> Route {
        let current = self.current.clone();
        self.go(current)
    }
}
