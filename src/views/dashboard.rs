use crate::api::models::{AdminMetrics, Poll, PollStatus};
use crate::identity::{Role, User};

/// Headline numbers on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_polls: u64,
    pub active_polls: u64,
    pub closed_polls: u64,
    pub total_votes: u64,
    /// Only known from server metrics.
    pub total_users: Option<u64>,
}

impl DashboardStats {
    /// Poll admins have no metrics endpoint; numbers come from the poll list.
    pub fn from_polls(polls: &[Poll]) -> Self {
        let count = |s: PollStatus| polls.iter().filter(|p| p.status == s).count() as u64;
        DashboardStats {
            total_polls: polls.len() as u64,
            active_polls: count(PollStatus::Active),
            closed_polls: count(PollStatus::Closed),
            total_votes: polls.iter().map(Poll::option_vote_sum).sum(),
            total_users: None,
        }
    }

    pub fn from_metrics(m: &AdminMetrics) -> Self {
        DashboardStats {
            total_polls: m.polls.total,
            active_polls: m.polls.active,
            closed_polls: m.polls.closed,
            total_votes: m.votes.total,
            total_users: Some(m.users.total),
        }
    }
}

/// Whether the dashboard is backed by server metrics for this role.
pub fn uses_server_metrics(role: Role) -> bool { role == Role::SystemAdmin }

pub fn dashboard_title(role: Role) -> &'static str { if uses_server_metrics(role) { "Admin Dashboard" } else { "Poll Dashboard" } }

/// Two-letter avatar initials from the username, else the email, else `U`.
pub fn initials(user: Option<&User>) -> String {
    user.and_then(|u| u.username.as_deref().filter(|n| !n.is_empty()).or(Some(u.email.as_str())).filter(|s| !s.is_empty()))
        .map(|s| s.chars().take(2).collect::<String>().to_uppercase())
        .unwrap_or_else(|| "U".to_string())
}
