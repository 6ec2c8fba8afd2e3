//! Poll results breakdown: ranking, percentages, winner and CSV export.

use crate::api::models::{Poll, PollResults};

use super::format::{csv_document, csv_field, format_date, percent_label, short_id};

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub rank: usize,
    pub option_id: String,
    pub option_text: String,
    pub votes: u64,
    /// Rounded to one decimal place.
    pub percentage: f64,
    /// Relative to the leading option, 0..=100.
    pub bar_width: f64,
    pub is_winner: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub poll_id: String,
    pub title: String,
    pub status_label: String,
    pub headline: String,
    pub total_votes: u64,
    pub rows: Vec<ResultRow>,
    pub closed_on: Option<String>,
}

pub fn round1(v: f64) -> f64 { (v * 10.0).round() / 10.0 }

impl ResultsView {
    pub fn build(results: &PollResults, poll: Option<&Poll>) -> Self {
        let mut sorted = results.results.clone();
        // stable: ties keep server order
        sorted.sort_by(|a, b| b.votes.cmp(&a.votes));

        let counted: u64 = sorted.iter().map(|o| o.votes).sum();
        let total = if counted > 0 { counted } else { results.total_votes };
        let max_votes = sorted.iter().map(|o| o.votes).max().unwrap_or(0).max(1);

        let rows = sorted
            .into_iter()
            .enumerate()
            .map(|(idx, o)| ResultRow {
                rank: idx + 1,
                percentage: if total > 0 { round1(o.votes as f64 * 100.0 / total as f64) } else { 0.0 },
                bar_width: o.votes as f64 * 100.0 / max_votes as f64,
                is_winner: idx == 0 && counted > 0,
                option_id: o.option_id,
                option_text: o.option_text,
                votes: o.votes,
            })
            .collect();

        let status_label = results.status.as_deref().filter(|s| !s.is_empty()).map(|s| s.to_uppercase()).unwrap_or_else(|| "ACTIVE".to_string());
        let headline = match status_label.as_str() {
            "CLOSED" => "Poll Closed".to_string(),
            "ACTIVE" => "Poll Active".to_string(),
            other => other.to_string(),
        };

        ResultsView {
            poll_id: results.poll_id.clone(),
            title: poll.map(|p| p.title.clone()).unwrap_or_else(|| "Poll Results".to_string()),
            status_label,
            headline,
            total_votes: total,
            rows,
            closed_on: poll.and_then(|p| p.closed_at.as_deref()).map(format_date),
        }
    }

    pub fn winner(&self) -> Option<&ResultRow> { self.rows.iter().find(|r| r.is_winner) }

    pub fn footer(&self) -> String {
        let mut s = format!("Poll ID: #{}", short_id(&self.poll_id));
        if let Some(d) = &self.closed_on {
            s.push_str(&format!(" • Closed on {}", d));
        }
        s
    }

    pub fn csv_file_name(&self) -> String { format!("poll-{}-results.csv", self.poll_id) }

    pub fn to_csv(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| vec![csv_field(&r.option_text), r.votes.to_string(), percent_label(r.percentage)])
            .collect();
        csv_document(&["Option", "Votes", "Percentage"], &rows)
    }
}
