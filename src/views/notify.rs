//! Transient user notifications.

use std::fmt;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub variant: ToastVariant,
    pub title: String,
    pub description: Option<String>,
}

impl Toast {
    pub fn success(title: impl Into<String>) -> Self { Self { variant: ToastVariant::Default, title: title.into(), description: None } }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { variant: ToastVariant::Destructive, title: title.into(), description: Some(description.into()) }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validation problems are titled by their message; request errors by the action that failed.
    pub fn from_error(action: &str, err: &ClientError) -> Self {
        match err {
            ClientError::Validation(msg) => Self { variant: ToastVariant::Destructive, title: msg.clone(), description: None },
            other => Self::error(action, other.message()),
        }
    }

    pub fn is_error(&self) -> bool { self.variant == ToastVariant::Destructive }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_error() { "!" } else { "*" };
        match &self.description {
            Some(d) => write!(f, "[{}] {}: {}", mark, self.title, d),
            None => write!(f, "[{}] {}", mark, self.title),
        }
    }
}
