//! Cosmetic formatting shared by the views.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::api::models::PollStatus;

/// `active` -> `Active`.
pub fn status_label(status: PollStatus) -> String { capitalize(status.as_str()) }

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// First eight characters of an identifier, as shown in receipts and footers.
pub fn short_id(id: &str) -> String { id.chars().take(8).collect() }

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Servers sometimes omit the offset; treat those as UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(n) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(n.and_utc());
        }
    }
    None
}

/// `Mar 1, 2025`. Unparseable input is returned unchanged.
pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw).map(|d| d.format("%b %-d, %Y").to_string()).unwrap_or_else(|| raw.to_string())
}

/// `Mar 1, 2025 14:05:09`. Unparseable input is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw).map(|d| d.format("%b %-d, %Y %H:%M:%S").to_string()).unwrap_or_else(|| raw.to_string())
}

/// One-decimal percentage label, e.g. `66.7%`.
pub fn percent_label(pct: f64) -> String { format!("{:.1}%", pct) }

/// Quoted CSV field with embedded quotes doubled.
pub fn csv_field(s: &str) -> String { format!("\"{}\"", s.replace('"', "\"\"")) }

pub fn csv_document(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = header.join(",");
    for r in rows {
        out.push('\n');
        out.push_str(&r.join(","));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(status_label(PollStatus::Closed), "Closed");
        assert_eq!(capitalize(""), "");
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(percent_label(66.66666), "66.7%");
    }

    #[test]
    fn dates() {
        assert_eq!(format_date("2025-03-01T10:00:00Z"), "Mar 1, 2025");
        assert_eq!(format_date("2025-12-24T23:59:59.123+00:00"), "Dec 24, 2025");
        assert_eq!(format_timestamp("2025-03-01 14:05:09"), "Mar 1, 2025 14:05:09");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn csv_quoting() {
        assert_eq!(csv_field(r#"say "hi""#), r#""say ""hi""""#);
        let doc = csv_document(&["A", "B"], &[vec!["1".into(), "2".into()]]);
        assert_eq!(doc, "A,B\n1,2\n");
    }
}
