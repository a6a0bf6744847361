//! Plain-text rendering of the board for the terminal.

use crate::board::{Filter, Notice, NoticeLevel, TaskBoard};
use crate::types::Task;

fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

fn filter_label(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "all",
        Filter::Completed => "completed",
        Filter::Incomplete => "incomplete",
    }
}

/// Format a notice as a single line.
pub fn format_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    format!("{}: {}", tag, notice.message)
}

/// Format the current page of the board as an aligned table.
pub fn format_board(board: &TaskBoard) -> String {
    let visible = board.visible();
    let mut out = String::new();

    if visible.is_empty() {
        out.push_str("No tasks\n");
    } else {
        let id_width = visible.iter().map(|t| t.id.len()).max().unwrap_or(2).max(2);
        let text_width = visible
            .iter()
            .map(|t| t.text.chars().count())
            .max()
            .unwrap_or(4)
            .max(4);

        out.push_str(&format!(
            "    {:<id_width$}  {:<text_width$}  SUBMITTER\n",
            "ID", "TASK"
        ));
        for task in visible {
            let submitter = match (task.name.is_empty(), task.email.is_empty()) {
                (true, true) => String::new(),
                (false, true) => task.name.clone(),
                (true, false) => format!("<{}>", task.email),
                (false, false) => format!("{} <{}>", task.name, task.email),
            };
            out.push_str(&format!(
                "{} {:<id_width$}  {:<text_width$}  {}\n",
                checkbox(task),
                task.id,
                task.text,
                submitter
            ));
        }
    }

    out.push_str(&format!(
        "-- page {} of {} ({} of {} tasks, filter: {})\n",
        board.page(),
        board.page_count(),
        board.filtered().len(),
        board.tasks().len(),
        filter_label(board.filter())
    ));
    out
}
