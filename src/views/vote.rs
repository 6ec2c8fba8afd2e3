use crate::api::models::{Poll, PollOption, VoteStatus};

use super::format::{format_date, parse_timestamp, short_id};

/// Receipt shown after voting.
#[derive(Debug, Clone)]
pub struct VoteReceiptView<'a> {
    pub poll: Option<&'a Poll>,
    pub status: &'a VoteStatus,
}

impl<'a> VoteReceiptView<'a> {
    pub fn new(poll: Option<&'a Poll>, status: &'a VoteStatus) -> Self { Self { poll, status } }

    pub fn has_vote(&self) -> bool { self.status.has_voted }

    /// The option the user picked, looked up by id on the poll.
    pub fn voted_option(&self) -> Option<&'a PollOption> {
        let option_id = self.status.option_id.as_deref()?;
        self.poll?.option(option_id)
    }

    /// `#ABCDEF12`
    pub fn vote_ref(&self) -> Option<String> { self.status.vote_id.as_deref().map(|id| format!("#{}", short_id(id).to_uppercase())) }

    pub fn voted_date(&self) -> Option<String> { self.status.voted_at.as_deref().map(format_date) }

    /// 12-hour clock, e.g. `2:05 PM`.
    pub fn voted_time(&self) -> Option<String> {
        let at = parse_timestamp(self.status.voted_at.as_deref()?)?;
        Some(at.format("%-I:%M %p").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::PollStatus;

    #[test]
    fn resolves_choice_and_receipt() {
        let poll = Poll {
            id: "p".into(),
            title: "Lunch?".into(),
            description: None,
            status: PollStatus::Active,
            options: vec![
                PollOption { id: "a".into(), option_text: "Pizza".into(), vote_count: None },
                PollOption { id: "b".into(), option_text: "Tacos".into(), vote_count: None },
            ],
            created_at: None,
            updated_at: None,
            closed_at: None,
            created_by: None,
            total_votes: None,
        };
        let status = VoteStatus {
            has_voted: true,
            vote_id: Some("deadbeefcafe".into()),
            option_id: Some("b".into()),
            voted_at: Some("2025-03-01T14:05:00Z".into()),
        };
        let r = VoteReceiptView::new(Some(&poll), &status);
        assert_eq!(r.voted_option().map(|o| o.option_text.as_str()), Some("Tacos"));
        assert_eq!(r.vote_ref().as_deref(), Some("#DEADBEEF"));
        assert_eq!(r.voted_date().as_deref(), Some("Mar 1, 2025"));
        assert_eq!(r.voted_time().as_deref(), Some("2:05 PM"));
        assert!(VoteReceiptView::new(None, &status).voted_option().is_none());
    }
}
