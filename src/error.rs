//! Unified client error model.
//! Every fallible library call returns `ClientResult<T>`; the shell turns the error
//! into a user-facing notification via `message()`.

use thiserror::Error;

pub const SESSION_EXPIRED_MSG: &str = "Session expired";
pub const NETWORK_ERROR_MSG: &str = "Unable to reach the server. Check your connection and try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any network call.
    #[error("validation: {0}")]
    Validation(String),
    /// Non-2xx response carrying the server-provided (or status-text) message.
    #[error("request failed ({status}): {message}")]
    Request { status: u16, message: String },
    /// Refresh-and-retry failed; the local session has been cleared.
    #[error("session expired")]
    SessionExpired,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("token storage: {0}")]
    Storage(String),
    #[error("configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn validation<S: Into<String>>(msg: S) -> Self { ClientError::Validation(msg.into()) }
    pub fn request<S: Into<String>>(status: u16, msg: S) -> Self { ClientError::Request { status, message: msg.into() } }

    pub fn code_str(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "validation",
            ClientError::Request { .. } => "request",
            ClientError::SessionExpired => "session_expired",
            ClientError::Network(_) => "network",
            ClientError::Decode(_) => "decode",
            ClientError::Storage(_) => "storage",
            ClientError::Config(_) => "config",
        }
    }

    /// Text suitable for showing to the user as-is.
    pub fn message(&self) -> String {
        match self {
            ClientError::Validation(m) => m.clone(),
            ClientError::Request { message, .. } => message.clone(),
            ClientError::SessionExpired => SESSION_EXPIRED_MSG.to_string(),
            ClientError::Network(_) => NETWORK_ERROR_MSG.to_string(),
            ClientError::Decode(m) | ClientError::Storage(m) | ClientError::Config(m) => m.clone(),
        }
    }

    /// HTTP status for request errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool { matches!(self, ClientError::SessionExpired) }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self { ClientError::Decode(err.to_string()) }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self { ClientError::Storage(err.to_string()) }
}

pub type ClientResult<T> = Result<T, ClientError>;
