//! HTML templates for the browser page.
//!
//! Templates are embedded at compile time using `include_str!`.

/// Placeholder in the index template replaced with the configured page size.
pub const PAGE_SIZE_PLACEHOLDER: &str = "{{PAGE_SIZE}}";

/// The task board page: table, add form, edit modal, filter and pagination.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Render the index page for the given page size.
pub fn render_index(page_size: usize) -> String {
    INDEX_TEMPLATE.replace(PAGE_SIZE_PLACEHOLDER, &page_size.to_string())
}
