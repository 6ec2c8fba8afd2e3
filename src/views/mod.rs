//! Client-side view logic. Everything here is pure: no I/O, no session access.

pub mod audit;
pub mod dashboard;
pub mod format;
pub mod notify;
pub mod poll_form;
pub mod polls;
pub mod register;
pub mod results;
pub mod vote;

pub use audit::{AuditFilter, Pagination};
pub use dashboard::DashboardStats;
pub use notify::{Toast, ToastVariant};
pub use poll_form::PollForm;
pub use polls::{AdminAction, PollCard, PollDetailView, PollTab};
pub use register::{password_strength, PasswordStrength};
pub use results::ResultsView;
pub use vote::VoteReceiptView;
