use crate::router::{Route, RouteAccess, LANDING};

use super::session::{Session, SessionStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect(Route),
}

/// Decide whether `access` may be rendered for `session`.
///
/// Only an Authenticated session with a matching role renders protected content.
/// Unauthenticated and Authenticating sessions go to login; a wrong role goes to the landing view.
pub fn check_access(session: &Session, access: RouteAccess) -> GuardDecision {
    match access {
        RouteAccess::Public => GuardDecision::Render,
        RouteAccess::Authenticated | RouteAccess::Roles(_) => {
            let user = match (session.status(), session.user.as_ref()) {
                (SessionStatus::Authenticated, Some(u)) => u,
                _ => return GuardDecision::Redirect(Route::Login),
            };
            match access {
                RouteAccess::Roles(roles) if !user.has_any_role(roles) => GuardDecision::Redirect(LANDING),
                _ => GuardDecision::Render,
            }
        }
    }
}

pub fn check_route(session: &Session, route: &Route) -> GuardDecision {
    if let Some(target) = route.static_redirect() {
        return GuardDecision::Redirect(target);
    }
    check_access(session, route.access())
}
