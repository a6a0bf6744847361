//! Core types for the task board.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

/// A stored task.
///
/// Optional submitter fields are always present on the wire, defaulting to
/// the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(alias = "task")]
    pub text: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request body for creating a task.
///
/// `text` is optional at the serde level so a missing field is reported as a
/// validation error rather than a body rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default, alias = "task", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Text of the task, or an error when missing or blank.
    pub fn validated_text(&self) -> ApiResult<&str> {
        match self.text.as_deref() {
            None => Err(ApiError::missing_field("text")),
            Some(text) if text.trim().is_empty() => Err(ApiError::missing_field("text")),
            Some(text) => Ok(text),
        }
    }
}

/// Partial update for a task. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, alias = "task", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.name.is_none()
            && self.email.is_none()
            && self.completed.is_none()
    }

    /// Reject patches that would break a task invariant.
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(text) = &self.text {
            if text.trim().is_empty() {
                return Err(ApiError::invalid_value("text", "text must not be empty"));
            }
        }
        Ok(())
    }

    /// Merge present fields into `task`.
    pub fn apply(&self, task: &mut Task) {
        if let Some(text) = &self.text {
            task.text = text.clone();
        }
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(email) = &self.email {
            task.email = email.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Response body for a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
}
