use serde_json::json;
use tracing::{debug, info, warn};

use crate::api::models::{LoginResponse, MeResponse, MessageResponse, RegisterResponse};
use crate::api::{ApiClient, ApiRequest};
use crate::error::{ClientError, ClientResult};
use crate::storage::TokenPair;

use super::session::{SessionStatus, SessionStore};
use super::user::{Role, User};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new<S: Into<String>>(email: S, password: S) -> Self { Self { email: email.into(), password: password.into() } }

    fn validate(&self) -> ClientResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::validation("Email and password are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl RegisterRequest {
    pub fn validate(&self) -> ClientResult<()> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(ClientError::validation("Please fill in all required fields"));
        }
        if self.password != self.confirm_password {
            return Err(ClientError::validation("Passwords do not match"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::validation(format!("Password must be at least {} characters", MIN_PASSWORD_LEN)));
        }
        Ok(())
    }
}

/// Login, registration, logout and identity hydration on top of the request pipeline.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub fn session(&self) -> &SessionStore { self.client.session() }

    /// On failure the session is left exactly as it was.
    pub async fn login(&self, req: &LoginRequest) -> ClientResult<User> {
        req.validate()?;
        let body = json!({ "email": req.email.trim(), "password": req.password });
        let resp: LoginResponse = self.client.send_json(ApiRequest::post("/auth/login").json(body).skip_auth()).await?;
        let pair = TokenPair::new(resp.access_token, resp.refresh_token.filter(|r| !r.is_empty()));

        let user = match resp.user {
            Some(user) => {
                self.session().establish(pair, user.clone())?;
                user
            }
            None => {
                // No profile in the login body: store tokens, then confirm identity.
                self.session().begin(pair)?;
                match self.me().await {
                    Ok(user) => {
                        self.session().set_user(user.clone());
                        user
                    }
                    Err(e) => {
                        if !e.is_session_expired() { self.session().clear(); }
                        return Err(e);
                    }
                }
            }
        };
        info!(user_id = %user.id, role = %user.role, "logged in");
        Ok(user)
    }

    pub async fn register(&self, req: &RegisterRequest) -> ClientResult<String> {
        req.validate()?;
        let body = json!({ "email": req.email.trim(), "password": req.password, "role": req.role.as_api_str() });
        let resp: RegisterResponse = self.client.send_json(ApiRequest::post("/auth/register").json(body).skip_auth()).await?;
        debug!(created = resp.user.is_some(), "registered");
        Ok(resp.message)
    }

    /// Always ends Unauthenticated, whatever the server says.
    pub async fn logout(&self) {
        if self.session().access_token().is_some() {
            match self.client.send_json::<MessageResponse>(ApiRequest::post("/auth/logout")).await {
                Ok(_) => debug!("server acknowledged logout"),
                Err(e) => warn!("logout notification failed (ignored): {}", e),
            }
        }
        self.session().clear();
    }

    pub async fn me(&self) -> ClientResult<User> {
        let resp: MeResponse = self.client.send_json(ApiRequest::get("/auth/me")).await?;
        Ok(resp.user)
    }

    /// Replaces the user with a fresh `/auth/me`; any failure clears the session.
    pub async fn refresh_user(&self) -> ClientResult<User> {
        match self.me().await {
            Ok(user) => {
                self.session().set_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!("identity fetch failed: {}", e);
                self.session().clear();
                Err(e)
            }
        }
    }

    /// Startup step: resolves an Authenticating session to Authenticated or Unauthenticated.
    pub async fn hydrate(&self) -> SessionStatus {
        if self.session().status() == SessionStatus::Authenticating {
            let _ = self.refresh_user().await;
        }
        self.session().status()
    }
}
