//! Client-side task board with optimistic updates.
//!
//! The board mirrors the store's task list. Each mutation goes through two
//! explicit steps: [`TaskBoard::apply`] changes local state immediately and
//! returns a [`Pending`] ticket, then the ticket is settled with either
//! [`TaskBoard::confirm`] (server accepted) or [`TaskBoard::roll_back`]
//! (server rejected, the affected task restored to its state at apply
//! time). Rollback only touches that task, so changes settled in between
//! survive. [`TaskBoard::submit`] runs both steps against a [`TaskApi`].
//!
//! Filtering and pagination only look at the in-memory list.

mod edit;
mod view;

pub use edit::EditDraft;
pub use view::Filter;

use crate::client::{ClientError, TaskApi};
use crate::types::{NewTask, Task, TaskPatch};
use tracing::{debug, warn};

/// Prefix of ids given to tasks that the server has not confirmed yet.
pub const PROVISIONAL_PREFIX: &str = "pending-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A user-facing message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// A change the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Add(NewTask),
    Edit { id: String, patch: TaskPatch },
    Toggle { id: String },
    Delete { id: String },
}

impl Mutation {
    /// Id of the existing task this mutation changes, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Mutation::Add(_) => None,
            Mutation::Edit { id, .. } | Mutation::Toggle { id } | Mutation::Delete { id } => {
                Some(id)
            }
        }
    }
}

/// The request a pending mutation still has to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create(NewTask),
    Update { id: String, patch: TaskPatch },
    Delete { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Edit,
    Toggle { completed: bool },
    Delete,
}

/// How to put the affected task back if the server rejects the change.
#[derive(Debug, Clone)]
enum Undo {
    /// Drop the provisional row.
    Remove,
    /// Put back the record as it was before the change.
    Restore(Task),
    /// Re-insert a deleted record near its old position.
    Reinsert { index: usize, task: Task },
}

/// A mutation that has been applied locally and awaits the server's answer.
#[derive(Debug)]
#[must_use = "a pending mutation must be confirmed or rolled back"]
pub struct Pending {
    seq: u64,
    action: Action,
    /// Local id of the affected task (provisional for adds).
    local_id: String,
    request: Request,
    undo: Undo,
}

impl Pending {
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }
}

/// Local mirror of the task collection.
#[derive(Debug, Clone)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    filter: Filter,
    page: usize,
    page_size: usize,
    next_seq: u64,
    in_flight: usize,
}

impl TaskBoard {
    /// Empty board. A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            tasks: Vec::new(),
            filter: Filter::All,
            page: 1,
            page_size: page_size.max(1),
            next_seq: 1,
            in_flight: 0,
        }
    }

    /// Fetch the full list and build a board from it.
    pub async fn load(api: &dyn TaskApi, page_size: usize) -> Result<Self, ClientError> {
        let mut board = Self::new(page_size);
        board.replace_all(api.list().await?);
        Ok(board)
    }

    /// Re-fetch the full list, keeping local state on failure.
    pub async fn refresh(&mut self, api: &dyn TaskApi) -> Option<Notice> {
        match api.list().await {
            Ok(tasks) => {
                self.replace_all(tasks);
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to load tasks");
                Some(failure_notice("Failed to load tasks", &e))
            }
        }
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.clamp_page();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of mutations applied but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply a mutation locally.
    ///
    /// Returns a notice without touching state when the mutation is invalid
    /// (blank text, unknown task, nothing to change) or targets a task whose
    /// create is still in flight.
    pub fn apply(&mut self, mutation: Mutation) -> Result<Pending, Notice> {
        let seq = self.next_seq;

        if mutation.target().is_some_and(is_provisional) {
            return Err(Notice::info("Task is still being saved."));
        }

        let (action, local_id, request, undo) = match mutation {
            Mutation::Add(input) => {
                let text = input
                    .validated_text()
                    .map_err(|_| Notice::error("Please enter a task."))?
                    .to_string();
                let local_id = format!("{}{}", PROVISIONAL_PREFIX, seq);
                self.tasks.push(Task {
                    id: local_id.clone(),
                    text,
                    name: input.name.clone().unwrap_or_default(),
                    email: input.email.clone().unwrap_or_default(),
                    completed: false,
                });
                (Action::Add, local_id, Request::Create(input), Undo::Remove)
            }
            Mutation::Edit { id, patch } => {
                if patch.is_empty() {
                    return Err(Notice::info("No changes to save."));
                }
                patch
                    .validate()
                    .map_err(|_| Notice::error("Please enter a task."))?;
                let task = self.find_mut(&id)?;
                let previous = task.clone();
                patch.apply(task);
                (
                    Action::Edit,
                    id.clone(),
                    Request::Update { id, patch },
                    Undo::Restore(previous),
                )
            }
            Mutation::Toggle { id } => {
                let task = self.find_mut(&id)?;
                let previous = task.clone();
                task.completed = !task.completed;
                let completed = task.completed;
                (
                    Action::Toggle { completed },
                    id.clone(),
                    Request::Update {
                        id,
                        patch: TaskPatch::completed(completed),
                    },
                    Undo::Restore(previous),
                )
            }
            Mutation::Delete { id } => {
                let index = self
                    .tasks
                    .iter()
                    .position(|t| t.id == id)
                    .ok_or_else(|| not_found_notice(&id))?;
                let task = self.tasks.remove(index);
                (
                    Action::Delete,
                    id.clone(),
                    Request::Delete { id },
                    Undo::Reinsert { index, task },
                )
            }
        };

        self.next_seq += 1;
        self.in_flight += 1;
        self.clamp_page();
        debug!(seq, task_id = %local_id, ?action, "Applied optimistic change");

        Ok(Pending {
            seq,
            action,
            local_id,
            request,
            undo,
        })
    }

    /// Settle a pending mutation the server accepted.
    ///
    /// `reply` is the server's record for creates and updates; it replaces
    /// the local one (last reply wins).
    pub fn confirm(&mut self, pending: Pending, reply: Option<Task>) -> Notice {
        self.in_flight = self.in_flight.saturating_sub(1);
        debug!(seq = pending.seq, task_id = %pending.local_id, "Confirmed change");

        if let Some(task) = reply {
            match self.tasks.iter_mut().find(|t| t.id == pending.local_id) {
                Some(slot) => *slot = task,
                // Created on the server but dropped locally by a rollback.
                None if pending.action == Action::Add => self.tasks.push(task),
                None => {}
            }
        }
        self.clamp_page();

        match pending.action {
            Action::Add => Notice::success("Task added successfully!"),
            Action::Edit => Notice::success("Task updated successfully!"),
            Action::Toggle { completed: true } => Notice::success("Task marked as complete."),
            Action::Toggle { completed: false } => Notice::success("Task unmarked as complete."),
            Action::Delete => Notice::success("Task deleted successfully!"),
        }
    }

    /// Settle a pending mutation the server rejected: undo its change to the
    /// affected task only.
    pub fn roll_back(&mut self, pending: Pending, err: &ClientError) -> Notice {
        self.in_flight = self.in_flight.saturating_sub(1);
        warn!(
            seq = pending.seq,
            task_id = %pending.local_id,
            error = %err,
            "Rolling back change"
        );

        match pending.undo {
            Undo::Remove => self.tasks.retain(|t| t.id != pending.local_id),
            Undo::Restore(previous) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == previous.id) {
                    *slot = previous;
                }
            }
            Undo::Reinsert { index, task } => {
                if self.get(&task.id).is_none() {
                    let index = index.min(self.tasks.len());
                    self.tasks.insert(index, task);
                }
            }
        }
        self.clamp_page();

        let prefix = match pending.action {
            Action::Add => "Failed to add task",
            Action::Edit => "Failed to update task",
            Action::Toggle { .. } => "Failed to update task status",
            Action::Delete => "Failed to delete task",
        };
        failure_notice(prefix, err)
    }

    /// Apply a mutation, send it, and settle it with the answer.
    pub async fn submit(&mut self, api: &dyn TaskApi, mutation: Mutation) -> Notice {
        let pending = match self.apply(mutation) {
            Ok(pending) => pending,
            Err(notice) => return notice,
        };

        let result = match pending.request() {
            Request::Create(input) => api.create(input).await.map(Some),
            Request::Update { id, patch } => api.update(id, patch).await.map(Some),
            Request::Delete { id } => api.delete(id).await.map(|()| None),
        };

        match result {
            Ok(reply) => self.confirm(pending, reply),
            Err(e) => self.roll_back(pending, &e),
        }
    }

    pub async fn add(&mut self, api: &dyn TaskApi, input: NewTask) -> Notice {
        self.submit(api, Mutation::Add(input)).await
    }

    pub async fn toggle(&mut self, api: &dyn TaskApi, id: &str) -> Notice {
        self.submit(api, Mutation::Toggle { id: id.to_string() })
            .await
    }

    pub async fn delete(&mut self, api: &dyn TaskApi, id: &str) -> Notice {
        self.submit(api, Mutation::Delete { id: id.to_string() })
            .await
    }

    /// Open a scoped edit draft for a task.
    pub fn begin_edit(&self, id: &str) -> Option<EditDraft> {
        self.get(id).map(EditDraft::new)
    }

    /// Commit an edit draft; only changed fields are sent.
    pub async fn save_edit(&mut self, api: &dyn TaskApi, draft: EditDraft) -> Notice {
        match draft.into_mutation() {
            Ok(mutation) => self.submit(api, mutation).await,
            Err(notice) => notice,
        }
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Task, Notice> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found_notice(id))
    }
}

fn is_provisional(id: &str) -> bool {
    id.starts_with(PROVISIONAL_PREFIX)
}

fn not_found_notice(id: &str) -> Notice {
    Notice::error(format!("Task not found: {}", id))
}

/// Failure toast: the server's message when it sent one, otherwise a generic one.
fn failure_notice(prefix: &str, err: &ClientError) -> Notice {
    match err.server_message() {
        Some(message) => Notice::error(format!("{}: {}", prefix, message)),
        None => Notice::error(format!("{}.", prefix)),
    }
}
