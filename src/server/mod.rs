//! HTTP server module.
//!
//! Serves the JSON task API and the browser page that drives it.

mod routes;
pub mod templates;

pub use routes::{ServerHandle, ServerState, build_router, start_server};
