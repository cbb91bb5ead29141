use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub enum Priority {
    Low,
    #[default]
    Moderate,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Moderate, Priority::High];

    /// Fixed sort rank: High sorts first, Low last.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Moderate => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Moderate => "Moderate",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidPriority(s.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("invalid priority '{0}', expected one of Low, Moderate, High")]
    InvalidPriority(String),
}

/// Request body for both create and update.
///
/// Every field is optional on the wire so a missing field surfaces as a
/// [`ValidationError`] instead of a decode failure.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TodoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl TodoPayload {
    pub fn new(title: impl Into<String>, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            priority: Some(priority.to_string()),
        }
    }

    pub fn validate(&self) -> Result<TodoDraft, ValidationError> {
        let title = required_text("title", self.title.as_deref())?;
        let description = required_text("description", self.description.as_deref())?;
        let priority = match self.priority.as_deref() {
            Some(raw) => raw.parse()?,
            None => Priority::default(),
        };

        Ok(TodoDraft {
            title,
            description,
            priority,
        })
    }
}

fn required_text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value {
        None => Err(ValidationError::MissingField(field)),
        Some(text) if text.trim().is_empty() => Err(ValidationError::EmptyField(field)),
        Some(text) => Ok(text.to_string()),
    }
}

/// A payload that passed validation and is ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl From<TodoDraft> for TodoPayload {
    fn from(draft: TodoDraft) -> Self {
        TodoPayload::new(draft.title, draft.description, draft.priority)
    }
}

/// Body of delete confirmations and of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
