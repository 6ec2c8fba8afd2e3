//! Session and identity for the polling client.
//! Keep the public surface thin and split implementation across sub-modules.

mod guard;
mod provider;
mod session;
mod user;

pub use guard::{check_access, check_route, GuardDecision};
pub use provider::{AuthService, LoginRequest, RegisterRequest, MIN_PASSWORD_LEN};
pub use session::{Session, SessionStatus, SessionStore};
pub use user::{Role, UnknownRole, User};
