//! Client side of the task API.
//!
//! [`TaskApi`] is the seam the board drives. [`HttpTaskApi`] talks to a running
//! server; [`Database`](crate::db::Database) implements it in-process.

mod http;
mod local;

pub use http::HttpTaskApi;

use crate::error::ApiError;
use crate::types::{NewTask, Task, TaskPatch};
use async_trait::async_trait;
use thiserror::Error;

/// Errors seen by API clients.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The server answered with an error status.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never got an answer.
    #[error("request failed: {0}")]
    Transport(String),

    /// The answer could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    /// Message the server supplied, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        let code = serde_json::to_value(err.code)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string));
        ClientError::Api {
            status: err.status().as_u16(),
            code,
            message: err.message,
        }
    }
}

/// Operations the task gateway offers.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, ClientError>;

    async fn create(&self, input: &NewTask) -> Result<Task, ClientError>;

    async fn update(&self, task_id: &str, patch: &TaskPatch) -> Result<Task, ClientError>;

    async fn delete(&self, task_id: &str) -> Result<(), ClientError>;
}
