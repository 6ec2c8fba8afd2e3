use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Closed set of account roles. Wire names are the uppercase server vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Voter,
    PollAdmin,
    SystemAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Voter, Role::PollAdmin, Role::SystemAdmin];
    pub const ADMINS: &'static [Role] = &[Role::PollAdmin, Role::SystemAdmin];

    pub fn as_api_str(&self) -> &'static str {
        match self {
            Role::Voter => "VOTER",
            Role::PollAdmin => "POLL_ADMIN",
            Role::SystemAdmin => "SYSTEM_ADMIN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Voter => "Voter",
            Role::PollAdmin => "Poll Admin",
            Role::SystemAdmin => "System Admin",
        }
    }

    pub fn is_admin(&self) -> bool { matches!(self, Role::PollAdmin | Role::SystemAdmin) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    // Accepts the server vocabulary case-insensitively, plus the older lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "VOTER" | "USER" => Ok(Role::Voter),
            "POLL_ADMIN" | "ADMIN" => Ok(Role::PollAdmin),
            "SYSTEM_ADMIN" => Ok(Role::SystemAdmin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_api_str()) }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> { s.serialize_str(self.as_api_str()) }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    pub fn new<S: Into<String>>(id: S, email: S, role: Role) -> Self {
        Self { id: id.into(), email: email.into(), role, username: None, is_active: None, created_at: None }
    }

    pub fn is_admin(&self) -> bool { self.role.is_admin() }

    pub fn has_any_role(&self, roles: &[Role]) -> bool { roles.contains(&self.role) }

    pub fn display_name(&self) -> &str { self.username.as_deref().filter(|u| !u.is_empty()).unwrap_or(&self.email) }
}
