//! In-process [`TaskApi`] over the store, with the same validation as the HTTP gateway.

use super::{ClientError, TaskApi};
use crate::db::Database;
use crate::error::ApiError;
use crate::types::{NewTask, Task, TaskPatch};
use async_trait::async_trait;

#[async_trait]
impl TaskApi for Database {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        Ok(self.list_tasks().map_err(ApiError::from)?)
    }

    async fn create(&self, input: &NewTask) -> Result<Task, ClientError> {
        input.validated_text()?;
        Ok(self.create_task(input).map_err(ApiError::from)?)
    }

    async fn update(&self, task_id: &str, patch: &TaskPatch) -> Result<Task, ClientError> {
        patch.validate()?;
        self.update_task(task_id, patch)
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::task_not_found(task_id).into())
    }

    async fn delete(&self, task_id: &str) -> Result<(), ClientError> {
        if self.delete_task(task_id).map_err(ApiError::from)? {
            Ok(())
        } else {
            Err(ApiError::task_not_found(task_id).into())
        }
    }
}
