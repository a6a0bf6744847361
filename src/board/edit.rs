use super::{Mutation, Notice};
use crate::types::{Task, TaskPatch};

/// Scoped edit of one task (the edit modal).
///
/// Changes live only in the draft; dropping it is a cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub text: String,
    pub name: String,
    pub email: String,
    original: Task,
}

impl EditDraft {
    pub(super) fn new(task: &Task) -> Self {
        Self {
            text: task.text.clone(),
            name: task.name.clone(),
            email: task.email.clone(),
            original: task.clone(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.original.id
    }

    /// Patch holding only the fields that differ from the task as it was opened.
    pub fn patch(&self) -> TaskPatch {
        let changed = |draft: &String, original: &String| {
            (draft != original).then(|| draft.clone())
        };
        TaskPatch {
            text: changed(&self.text, &self.original.text),
            name: changed(&self.name, &self.original.name),
            email: changed(&self.email, &self.original.email),
            completed: None,
        }
    }

    /// Turn the draft into an edit mutation.
    pub fn into_mutation(self) -> Result<Mutation, Notice> {
        if self.text.trim().is_empty() {
            return Err(Notice::error("Please enter a task."));
        }
        let patch = self.patch();
        if patch.is_empty() {
            return Err(Notice::info("No changes to save."));
        }
        Ok(Mutation::Edit {
            id: self.original.id,
            patch,
        })
    }
}
