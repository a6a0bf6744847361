//! Filtering and pagination over the in-memory list.

use super::TaskBoard;
use crate::types::Task;

/// Which tasks the board shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl Filter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => task.completed,
            Filter::Incomplete => !task.completed,
        }
    }
}

impl TaskBoard {
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Change the filter and go back to the first page.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Tasks passing the filter, in list order.
    pub fn filtered(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }

    /// Number of pages for the filtered list; never less than one.
    pub fn page_count(&self) -> usize {
        let count = self.tasks.iter().filter(|t| self.filter.matches(t)).count();
        count.div_ceil(self.page_size).max(1)
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Jump to a page, clamped to the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    /// Tasks on the current page.
    pub fn visible(&self) -> Vec<&Task> {
        let start = (self.page - 1) * self.page_size;
        self.filtered()
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    pub(super) fn clamp_page(&mut self) {
        self.page = self.page.clamp(1, self.page_count());
    }
}
