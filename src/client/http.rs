use super::{ClientError, TaskApi};
use crate::types::{DeleteResponse, NewTask, Task, TaskPatch};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Error body returned by the gateway.
#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: String,
}

/// [`TaskApi`] over HTTP.
#[derive(Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.base_url, task_id)
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }

    let text = res
        .text()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.message),
        Err(_) if !text.trim().is_empty() => (None, text),
        Err(_) => (
            None,
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        ),
    };
    debug!(status = status.as_u16(), ?code, "API returned an error");

    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        let res = self.client.get(self.tasks_url()).send().await?;
        decode(res).await
    }

    async fn create(&self, input: &NewTask) -> Result<Task, ClientError> {
        let res = self
            .client
            .post(self.tasks_url())
            .json(input)
            .send()
            .await?;
        decode(res).await
    }

    async fn update(&self, task_id: &str, patch: &TaskPatch) -> Result<Task, ClientError> {
        let res = self
            .client
            .patch(self.task_url(task_id))
            .json(patch)
            .send()
            .await?;
        decode(res).await
    }

    async fn delete(&self, task_id: &str) -> Result<(), ClientError> {
        let res = self.client.delete(self.task_url(task_id)).send().await?;
        decode::<DeleteResponse>(res).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpTaskApi::new("http://127.0.0.1:3000/");
        assert_eq!(api.base_url(), "http://127.0.0.1:3000");
        assert_eq!(api.tasks_url(), "http://127.0.0.1:3000/tasks");
        assert_eq!(api.task_url("abc"), "http://127.0.0.1:3000/tasks/abc");
    }
}
