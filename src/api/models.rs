//! Wire models for the polling API and the normalized shapes the rest of the crate uses.
//!
//! The server speaks uppercase statuses (`DRAFT|ACTIVE|CLOSED`) and calls option text `text`;
//! internally statuses are a lowercase enum and option text is `option_text`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::identity::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollStatus {
    Draft,
    Active,
    Closed,
}

impl PollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollStatus::Draft => "draft",
            PollStatus::Active => "active",
            PollStatus::Closed => "closed",
        }
    }

    pub fn as_api_str(&self) -> &'static str {
        match self {
            PollStatus::Draft => "DRAFT",
            PollStatus::Active => "ACTIVE",
            PollStatus::Closed => "CLOSED",
        }
    }
}

impl FromStr for PollStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PollStatus::Draft),
            "active" => Ok(PollStatus::Active),
            "closed" => Ok(PollStatus::Closed),
            other => Err(format!("unknown poll status '{}'", other)),
        }
    }
}

impl fmt::Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl Serialize for PollStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> { s.serialize_str(self.as_str()) }
}

impl<'de> Deserialize<'de> for PollStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// --- Wire shapes ---

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPollOption {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPoll {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: PollStatus,
    #[serde(default)]
    pub options: Vec<ApiPollOption>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub total_votes: Option<u64>,
}

/// Single-poll responses come either wrapped (`{"poll": {...}}`) or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PollEnvelope {
    Wrapped { poll: ApiPoll },
    Bare(ApiPoll),
}

impl PollEnvelope {
    pub fn into_poll(self) -> Poll {
        match self {
            PollEnvelope::Wrapped { poll } | PollEnvelope::Bare(poll) => poll.into(),
        }
    }
}

/// List responses come either wrapped (`{"polls": [...]}`) or as a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PollListEnvelope {
    Wrapped { polls: Vec<ApiPoll> },
    Bare(Vec<ApiPoll>),
}

impl PollListEnvelope {
    pub fn into_polls(self) -> Vec<Poll> {
        match self {
            PollListEnvelope::Wrapped { polls } | PollListEnvelope::Bare(polls) => polls.into_iter().map(Poll::from).collect(),
        }
    }
}

// --- Normalized shapes ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollOption {
    pub id: String,
    pub option_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Poll {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: PollStatus,
    pub options: Vec<PollOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_votes: Option<u64>,
}

impl Poll {
    /// Sum of per-option counts; options without a count contribute nothing.
    pub fn option_vote_sum(&self) -> u64 { self.options.iter().map(|o| o.vote_count.unwrap_or(0)).sum() }

    pub fn option(&self, option_id: &str) -> Option<&PollOption> { self.options.iter().find(|o| o.id == option_id) }
}

fn non_empty(s: Option<String>) -> Option<String> { s.filter(|v| !v.is_empty()) }

impl From<ApiPoll> for Poll {
    fn from(raw: ApiPoll) -> Self {
        Poll {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            status: raw.status,
            options: raw.options.into_iter().map(|o| PollOption { id: o.id, option_text: o.text, vote_count: o.vote_count }).collect(),
            created_at: raw.created_at,
            updated_at: non_empty(raw.updated_at),
            closed_at: non_empty(raw.closed_at),
            created_by: raw.owner_id,
            total_votes: raw.total_votes,
        }
    }
}

/// Validated input for create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub title: String,
    pub description: Option<String>,
    pub options: Vec<String>,
}

impl PollDraft {
    pub fn to_wire(&self) -> Value {
        let mut body = serde_json::json!({
            "title": self.title,
            "options": self.options.iter().map(|t| serde_json::json!({ "text": t })).collect::<Vec<_>>(),
        });
        if let Some(d) = &self.description {
            body["description"] = Value::String(d.clone());
        }
        body
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollResultOption {
    #[serde(deserialize_with = "id_string")]
    pub option_id: String,
    #[serde(alias = "text")]
    pub option_text: String,
    #[serde(default)]
    pub votes: u64,
    /// Server-side percentage; views recompute it from `votes`.
    #[serde(default)]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollResults {
    #[serde(deserialize_with = "id_string")]
    pub poll_id: String,
    #[serde(default)]
    pub total_votes: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<PollResultOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub vote_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VoteStatus {
    #[serde(default)]
    pub has_voted: bool,
    #[serde(default)]
    pub vote_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub option_id: Option<String>,
    #[serde(default)]
    pub voted_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosedPollResult {
    #[serde(deserialize_with = "id_string")]
    pub poll_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub total_votes: u64,
    #[serde(default)]
    pub results: Vec<PollResultOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosedResults {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub polls: Vec<ClosedPollResult>,
}

// --- Auth wire shapes ---

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// --- Admin ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserMetrics {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PollMetrics {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub closed: u64,
    #[serde(default)]
    pub draft: u64,
    #[serde(default)]
    pub created_last_24h: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VoteMetrics {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub submitted_last_24h: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditMetrics {
    #[serde(default)]
    pub events_last_24h: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminMetrics {
    #[serde(default)]
    pub users: UserMetrics,
    #[serde(default)]
    pub polls: PollMetrics,
    #[serde(default)]
    pub votes: VoteMetrics,
    #[serde(default)]
    pub audit: AuditMetrics,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub actor_user_id: Option<String>,
    #[serde(default)]
    pub actor_role: Option<String>,
    pub action: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogPage {
    #[serde(default)]
    pub logs: Vec<AuditLog>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

// Ids arrive as strings from most endpoints and as integers from a few.
fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected id, found {}", other))),
    }
}

fn opt_id_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("expected id, found {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_poll() -> Value {
        json!({
            "id": "p1", "title": "Lunch?", "status": "ACTIVE",
            "options": [{"id": "o1", "text": "Yes", "vote_count": 2}, {"id": 2, "text": "No"}],
            "created_at": "2025-03-01T10:00:00Z", "closed_at": "", "owner_id": "u9", "total_votes": 2
        })
    }

    #[test]
    fn normalizes_status_and_option_text() {
        let p = serde_json::from_value::<PollEnvelope>(raw_poll()).unwrap().into_poll();
        assert_eq!(p.status, PollStatus::Active);
        assert_eq!(p.options[0].option_text, "Yes");
        assert_eq!(p.options[1].id, "2");
        assert_eq!(p.closed_at, None);
        assert_eq!(p.created_by.as_deref(), Some("u9"));
        assert_eq!(p.option_vote_sum(), 2);
        assert_eq!(serde_json::to_value(&p).unwrap()["status"], "active");
    }

    #[test]
    fn envelopes_accept_wrapped_and_bare() {
        let wrapped = serde_json::from_value::<PollEnvelope>(json!({ "poll": raw_poll() })).unwrap().into_poll();
        assert_eq!(wrapped.id, "p1");
        let list = serde_json::from_value::<PollListEnvelope>(json!({ "polls": [raw_poll()] })).unwrap().into_polls();
        assert_eq!(list.len(), 1);
        let bare = serde_json::from_value::<PollListEnvelope>(json!([raw_poll(), raw_poll()])).unwrap().into_polls();
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn draft_wire_body() {
        let d = PollDraft { title: "T".into(), description: None, options: vec!["A".into(), "B".into()] };
        let v = d.to_wire();
        assert_eq!(v["options"][1]["text"], "B");
        assert!(v.get("description").is_none());
    }

    #[test]
    fn metrics_tolerate_missing_sections() {
        let m: AdminMetrics = serde_json::from_value(json!({"polls": {"total": 4, "active": 1}})).unwrap();
        assert_eq!(m.polls.total, 4);
        assert_eq!(m.users.total, 0);
    }
}
