//! Client subcommands: drive the board against a task API and print the result.

use super::{AddArgs, Command, EditArgs, ListArgs};
use crate::board::{Notice, TaskBoard};
use crate::client::TaskApi;
use crate::format::{format_board, format_notice};
use crate::types::NewTask;
use anyhow::{Result, anyhow, bail};

/// Outcome of a client command, ready for printing.
#[derive(Debug)]
pub struct Report {
    pub notice: Option<Notice>,
    pub board: TaskBoard,
}

impl Report {
    pub fn is_error(&self) -> bool {
        self.notice.as_ref().is_some_and(Notice::is_error)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(notice) = &self.notice {
            out.push_str(&format_notice(notice));
            out.push('\n');
        }
        out.push_str(&format_board(&self.board));
        out
    }

    /// Turn an error notice into an error, so the process exits non-zero.
    pub fn into_result(self) -> Result<()> {
        match self.notice {
            Some(notice) if notice.is_error() => Err(anyhow!(notice.message)),
            _ => Ok(()),
        }
    }
}

/// Run a client command. `Serve` is not a client command.
pub async fn run(command: Command, api: &dyn TaskApi, page_size: usize) -> Result<Report> {
    let mut board = TaskBoard::load(api, page_size)
        .await
        .map_err(|e| anyhow!("Failed to load tasks: {}", e))?;

    let notice = match command {
        Command::Serve(_) => bail!("serve is not a client command"),
        Command::List(ListArgs { filter, page }) => {
            board.set_filter(filter.into());
            board.set_page(page);
            None
        }
        Command::Add(AddArgs { text, name, email }) => {
            let mut input = NewTask::new(text);
            input.name = name;
            input.email = email;
            let notice = board.add(api, input).await;
            board.set_page(board.page_count());
            Some(notice)
        }
        Command::Edit(EditArgs {
            id,
            text,
            name,
            email,
        }) => {
            let Some(mut draft) = board.begin_edit(&id) else {
                bail!("Task not found: {}", id);
            };
            if let Some(text) = text {
                draft.text = text;
            }
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(email) = email {
                draft.email = email;
            }
            Some(board.save_edit(api, draft).await)
        }
        Command::Toggle(arg) => Some(board.toggle(api, &arg.id).await),
        Command::Delete(arg) => Some(board.delete(api, &arg.id).await),
    };

    Ok(Report { notice, board })
}
