//! Create/edit poll form state and its pre-submit validation.

use crate::api::models::{Poll, PollDraft};
use crate::error::{ClientError, ClientResult};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTION_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollForm {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
}

impl Default for PollForm {
    fn default() -> Self { Self { title: String::new(), description: String::new(), options: vec![String::new(); MIN_OPTIONS] } }
}

impl PollForm {
    /// Prefills the form for editing an existing poll.
    pub fn from_poll(poll: &Poll) -> Self {
        let mut options: Vec<String> = poll.options.iter().map(|o| o.option_text.clone()).collect();
        while options.len() < MIN_OPTIONS {
            options.push(String::new());
        }
        Self { title: poll.title.clone(), description: poll.description.clone().unwrap_or_default(), options }
    }

    pub fn add_option(&mut self) { self.options.push(String::new()); }

    /// Ignored when it would leave fewer than two option slots.
    pub fn remove_option(&mut self, idx: usize) -> bool {
        if self.options.len() <= MIN_OPTIONS || idx >= self.options.len() {
            return false;
        }
        self.options.remove(idx);
        true
    }

    /// Input is capped at `MAX_OPTION_LEN` characters.
    pub fn update_option(&mut self, idx: usize, value: &str) -> bool {
        match self.options.get_mut(idx) {
            Some(slot) => {
                *slot = value.chars().take(MAX_OPTION_LEN).collect();
                true
            }
            None => false,
        }
    }

    pub fn validate(&self) -> ClientResult<PollDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ClientError::validation("Title is required"));
        }
        let options: Vec<String> = self.options.iter().map(|o| o.trim()).filter(|o| !o.is_empty()).map(|o| o.to_string()).collect();
        if options.len() < MIN_OPTIONS {
            return Err(ClientError::validation("At least 2 options are required"));
        }
        let description = Some(self.description.trim()).filter(|d| !d.is_empty()).map(|d| d.to_string());
        Ok(PollDraft { title: title.to_string(), description, options })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, options: &[&str]) -> PollForm {
        PollForm { title: title.into(), description: "  ".into(), options: options.iter().map(|s| s.to_string()).collect() }
    }

    #[test]
    fn trims_and_drops_blank_options() {
        let d = form("  Lunch? ", &[" Pizza ", "", "Tacos"]).validate().unwrap();
        assert_eq!(d.title, "Lunch?");
        assert_eq!(d.options, vec!["Pizza", "Tacos"]);
        assert_eq!(d.description, None);
    }

    #[test]
    fn validation_errors() {
        assert_eq!(form("   ", &["a", "b"]).validate().unwrap_err().message(), "Title is required");
        assert_eq!(form("T", &["a", "  "]).validate().unwrap_err().message(), "At least 2 options are required");
    }

    #[test]
    fn option_slots() {
        let mut f = PollForm::default();
        assert!(!f.remove_option(0));
        f.add_option();
        assert!(f.remove_option(2));
        assert_eq!(f.options.len(), 2);
        let long = "x".repeat(250);
        assert!(f.update_option(0, &long));
        assert_eq!(f.options[0].len(), MAX_OPTION_LEN);
        assert!(!f.update_option(9, "nope"));
    }
}
