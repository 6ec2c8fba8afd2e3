use std::fmt;

use crate::identity::Role;

/// Roles offered on the public registration page, keyed by route slug.
pub const ROLE_CHOICES: &[(&str, Role)] = &[("voter", Role::Voter), ("poll-admin", Role::PollAdmin)];

pub fn role_for_slug(slug: &str) -> Option<Role> {
    ROLE_CHOICES.iter().find(|(s, _)| s.eq_ignore_ascii_case(slug)).map(|(_, r)| *r)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Medium => "Medium",
            PasswordStrength::Strong => "Strong",
        }
    }

    /// Filled quarters of the strength meter.
    pub fn meter(&self) -> usize {
        match self {
            PasswordStrength::Weak => 1,
            PasswordStrength::Medium => 2,
            PasswordStrength::Strong => 4,
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

pub fn password_strength(pw: &str) -> PasswordStrength {
    let len = pw.chars().count();
    if len < 6 {
        return PasswordStrength::Weak;
    }
    let score = [
        len >= 8,
        pw.chars().any(|c| c.is_ascii_uppercase()),
        pw.chars().any(|c| c.is_ascii_digit()),
        pw.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .iter()
    .filter(|b| **b)
    .count();
    match score {
        0 | 1 => PasswordStrength::Weak,
        2 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}
