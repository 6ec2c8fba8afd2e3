//! Poll list tabs and the poll detail page.

use std::fmt;
use std::str::FromStr;

use crate::api::models::{Poll, PollStatus, VoteStatus};
use crate::error::{ClientError, ClientResult};
use crate::identity::User;

use super::format::{format_date, status_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollTab {
    #[default]
    Active,
    Closed,
    Draft,
    Results,
}

impl PollTab {
    pub fn label(&self) -> &'static str {
        match self {
            PollTab::Active => "Active",
            PollTab::Closed => "Closed",
            PollTab::Draft => "Drafts",
            PollTab::Results => "Results",
        }
    }

    /// Drafts are only offered to admins.
    pub fn available(user: Option<&User>) -> Vec<PollTab> {
        let mut tabs = vec![PollTab::Active, PollTab::Closed];
        if user.map(|u| u.is_admin()).unwrap_or(false) {
            tabs.push(PollTab::Draft);
        }
        tabs.push(PollTab::Results);
        tabs
    }

    pub fn matches(&self, status: PollStatus) -> bool {
        match self {
            PollTab::Active => status == PollStatus::Active,
            PollTab::Closed => status == PollStatus::Closed,
            PollTab::Draft => status == PollStatus::Draft,
            PollTab::Results => matches!(status, PollStatus::Active | PollStatus::Closed),
        }
    }
}

impl FromStr for PollTab {
    type Err = ClientError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(PollTab::Active),
            "closed" => Ok(PollTab::Closed),
            "draft" | "drafts" => Ok(PollTab::Draft),
            "results" => Ok(PollTab::Results),
            other => Err(ClientError::validation(format!("Unknown tab '{}'", other))),
        }
    }
}

impl fmt::Display for PollTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

pub fn filter_polls<'a>(polls: &'a [Poll], tab: PollTab) -> Vec<&'a Poll> { polls.iter().filter(|p| tab.matches(p.status)).collect() }

/// One row of the poll list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCard {
    pub id: String,
    pub title: String,
    pub status: String,
    pub options: usize,
    pub created: String,
}

impl PollCard {
    pub fn from_poll(p: &Poll) -> Self {
        PollCard {
            id: p.id.clone(),
            title: p.title.clone(),
            status: status_label(p.status),
            options: p.options.len(),
            created: p.created_at.as_deref().map(format_date).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Edit,
    Publish,
    Close,
    Delete,
}

impl AdminAction {
    pub fn label(&self) -> &'static str {
        match self {
            AdminAction::Edit => "edit",
            AdminAction::Publish => "publish",
            AdminAction::Close => "close",
            AdminAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollDetailView {
    pub poll: Poll,
    pub vote: VoteStatus,
    pub is_admin: bool,
}

impl PollDetailView {
    pub fn new(poll: Poll, vote: VoteStatus, user: Option<&User>) -> Self {
        let is_admin = user.map(|u| u.is_admin()).unwrap_or(false);
        Self { poll, vote, is_admin }
    }

    pub fn headline(&self) -> &'static str {
        match self.poll.status {
            PollStatus::Active => "Active Poll",
            PollStatus::Closed => "Poll Closed",
            PollStatus::Draft => "Draft",
        }
    }

    pub fn has_voted(&self) -> bool { self.vote.has_voted }

    pub fn can_vote(&self) -> bool { self.poll.status == PollStatus::Active && !self.vote.has_voted }

    pub fn admin_actions(&self) -> Vec<AdminAction> {
        if !self.is_admin {
            return Vec::new();
        }
        let mut actions = Vec::new();
        match self.poll.status {
            PollStatus::Draft => {
                actions.push(AdminAction::Edit);
                actions.push(AdminAction::Publish);
            }
            PollStatus::Active => actions.push(AdminAction::Close),
            PollStatus::Closed => {}
        }
        actions.push(AdminAction::Delete);
        actions
    }

    /// Resolves a ballot choice given as a 1-based position or an option id.
    pub fn select_option(&self, choice: Option<&str>) -> ClientResult<String> {
        let choice = choice.map(str::trim).filter(|c| !c.is_empty()).ok_or_else(|| ClientError::validation("Please select an option"))?;
        if let Some(opt) = self.poll.option(choice) {
            return Ok(opt.id.clone());
        }
        choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.poll.options.get(idx))
            .map(|o| o.id.clone())
            .ok_or_else(|| ClientError::validation("Please select an option"))
    }
}
