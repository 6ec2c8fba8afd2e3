//! Route table for the view layer.
//! Paths mirror the web client's URLs so links and bookmarks carry over unchanged.

use std::fmt;

use crate::identity::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    /// Role picker.
    Register,
    /// Registration form for a chosen role slug (`voter`, `poll-admin`).
    RegisterAs(String),
    Root,
    Polls,
    PollCreate,
    PollDetail(String),
    PollEdit(String),
    PollResults(String),
    VoteStatus(String),
    Profile,
    Admin,
    AuditLogs,
    NotFound(String),
}

/// What a route demands of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

const SYSTEM_ADMIN_ONLY: &[Role] = &[Role::SystemAdmin];

/// Where authenticated users land when a route is off-limits to their role.
pub const LANDING: Route = Route::Polls;

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segs.as_slice() {
            [] => Route::Root,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["register", role] => Route::RegisterAs(role.to_string()),
            ["polls"] => Route::Polls,
            ["polls", "create"] => Route::PollCreate,
            ["polls", id] => Route::PollDetail(id.to_string()),
            ["polls", id, "edit"] => Route::PollEdit(id.to_string()),
            ["polls", id, "results"] => Route::PollResults(id.to_string()),
            ["polls", id, "voted"] => Route::VoteStatus(id.to_string()),
            ["profile"] => Route::Profile,
            ["admin"] => Route::Admin,
            ["admin", "audit-logs"] => Route::AuditLogs,
            _ => Route::NotFound(format!("/{}", segs.join("/"))),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".into(),
            Route::Register => "/register".into(),
            Route::RegisterAs(role) => format!("/register/{}", role),
            Route::Root => "/".into(),
            Route::Polls => "/polls".into(),
            Route::PollCreate => "/polls/create".into(),
            Route::PollDetail(id) => format!("/polls/{}", id),
            Route::PollEdit(id) => format!("/polls/{}/edit", id),
            Route::PollResults(id) => format!("/polls/{}/results", id),
            Route::VoteStatus(id) => format!("/polls/{}/voted", id),
            Route::Profile => "/profile".into(),
            Route::Admin => "/admin".into(),
            Route::AuditLogs => "/admin/audit-logs".into(),
            Route::NotFound(p) => p.clone(),
        }
    }

    pub fn access(&self) -> RouteAccess {
        match self {
            Route::Login | Route::Register | Route::RegisterAs(_) | Route::NotFound(_) => RouteAccess::Public,
            Route::PollCreate | Route::PollEdit(_) | Route::Admin => RouteAccess::Roles(Role::ADMINS),
            Route::AuditLogs => RouteAccess::Roles(SYSTEM_ADMIN_ONLY),
            Route::Root
            | Route::Polls
            | Route::PollDetail(_)
            | Route::PollResults(_)
            | Route::VoteStatus(_)
            | Route::Profile => RouteAccess::Authenticated,
        }
    }

    /// Unconditional redirects that do not depend on the session.
    pub fn static_redirect(&self) -> Option<Route> {
        match self {
            Route::Root => Some(LANDING),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.path()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::Root);
        assert_eq!(Route::parse("/polls/"), Route::Polls);
        assert_eq!(Route::parse("/polls/create"), Route::PollCreate);
        assert_eq!(Route::parse("/polls/42"), Route::PollDetail("42".into()));
        assert_eq!(Route::parse("/polls/42/results?x=1"), Route::PollResults("42".into()));
        assert_eq!(Route::parse("/register/poll-admin"), Route::RegisterAs("poll-admin".into()));
        assert_eq!(Route::parse("/admin/audit-logs"), Route::AuditLogs);
        assert_eq!(Route::parse("/nope/deeper"), Route::NotFound("/nope/deeper".into()));
    }

    #[test]
    fn path_roundtrips() {
        for p in ["/login", "/polls", "/polls/7/edit", "/polls/7/voted", "/admin", "/profile"] {
            assert_eq!(Route::parse(p).path(), p);
        }
    }

    #[test]
    fn access_levels() {
        assert_eq!(Route::Login.access(), RouteAccess::Public);
        assert_eq!(Route::Polls.access(), RouteAccess::Authenticated);
        assert_eq!(Route::AuditLogs.access(), RouteAccess::Roles(&[Role::SystemAdmin]));
        assert_eq!(Route::Admin.access(), RouteAccess::Roles(Role::ADMINS));
        assert_eq!(Route::Root.static_redirect(), Some(Route::Polls));
    }
}
