//! Audit log browsing: search, action filter, paging and CSV export.
//!
//! Filtering is applied to the page the server returned; paging is server-side
//! through `limit`/`offset`.

use std::collections::BTreeSet;

use crate::api::models::AuditLog;

use super::format::{csv_document, csv_field, format_timestamp, short_id};

pub const AUDIT_PAGE_SIZE: u64 = 20;
pub const AUDIT_CSV_FILE: &str = "audit-logs.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub search: String,
    /// `None` means all actions.
    pub action: Option<String>,
}

impl AuditFilter {
    pub fn new(search: impl Into<String>) -> Self { Self { search: search.into(), action: None } }

    pub fn with_action(mut self, action: Option<String>) -> Self {
        self.action = action.filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case("all"));
        self
    }

    pub fn matches(&self, log: &AuditLog) -> bool {
        if let Some(action) = &self.action {
            if &log.action != action {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |s: Option<&str>| s.map(|v| v.to_lowercase().contains(&needle)).unwrap_or(false);
        hit(Some(&log.action))
            || hit(log.actor_user_id.as_deref())
            || hit(log.entity_id.as_deref())
            || log.details.as_ref().map(|d| d.to_string().to_lowercase().contains(&needle)).unwrap_or(false)
    }

    pub fn apply<'a>(&self, logs: &'a [AuditLog]) -> Vec<&'a AuditLog> { logs.iter().filter(|l| self.matches(l)).collect() }
}

pub fn distinct_actions(logs: &[AuditLog]) -> Vec<String> { logs.iter().map(|l| l.action.clone()).collect::<BTreeSet<_>>().into_iter().collect() }

pub fn resource_label(log: &AuditLog) -> String {
    let entity_type = log.entity_type.as_deref().unwrap_or("");
    let entity_id = log.entity_id.as_deref().filter(|id| !id.is_empty());
    match (entity_type, entity_id) {
        ("POLL", Some(id)) => format!("Poll: #{}", short_id(id).to_uppercase()),
        ("AUTH", _) => "System Access".to_string(),
        ("USER", Some(id)) => format!("User: #{}", short_id(id).to_uppercase()),
        ("", _) => "System".to_string(),
        (other, _) => other.to_string(),
    }
}

pub fn result_label(action: &str) -> &'static str { if action.contains("FAILURE") { "Failed" } else { "Success" } }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

impl Pagination {
    pub fn new(offset: u64, total: u64) -> Self { Self { limit: AUDIT_PAGE_SIZE, offset, total } }

    /// Offset of a 1-based page number.
    pub fn offset_for_page(page: u64) -> u64 { page.saturating_sub(1) * AUDIT_PAGE_SIZE }

    pub fn total_pages(&self) -> u64 { self.total.div_ceil(self.limit.max(1)) }

    pub fn current_page(&self) -> u64 { self.offset / self.limit.max(1) + 1 }

    pub fn has_prev(&self) -> bool { self.offset > 0 }

    pub fn has_next(&self) -> bool { self.offset + self.limit < self.total }

    pub fn summary(&self) -> String {
        if self.total == 0 {
            return "No logs".to_string();
        }
        if self.offset >= self.total {
            return "No logs on this page".to_string();
        }
        format!("Showing {}-{} of {} logs", self.offset + 1, (self.offset + self.limit).min(self.total), self.total)
    }
}

/// `None` when there is nothing to export.
pub fn audit_csv(logs: &[&AuditLog]) -> Option<String> {
    if logs.is_empty() {
        return None;
    }
    let rows: Vec<Vec<String>> = logs
        .iter()
        .map(|l| {
            vec![
                csv_field(&format_timestamp(&l.created_at)),
                csv_field(l.actor_user_id.as_deref().unwrap_or("Unknown")),
                csv_field(&l.action),
                csv_field(&resource_label(l)),
                csv_field(l.entity_id.as_deref().unwrap_or("")),
                csv_field(l.ip_address.as_deref().unwrap_or("")),
            ]
        })
        .collect();
    Some(csv_document(&["Timestamp", "User", "Action", "Resource", "Entity ID", "IP Address"], &rows))
}
