//! HTTP server implementation.
//!
//! This module provides the axum-based HTTP server that exposes the task
//! API and serves the browser page.

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, patch},
};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::templates;
use crate::db::Database;
use crate::error::{ApiError, ApiResult};
use crate::types::{DeleteResponse, NewTask, Task, TaskPatch};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct ServerState {
    /// Task store, opened once at startup.
    db: Database,
    /// Rows per page in the browser page.
    page_size: usize,
}

impl ServerState {
    pub fn new(db: Database, page_size: usize) -> Self {
        Self { db, page_size }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Root endpoint - serves the task board page.
async fn root(State(state): State<ServerState>) -> Html<String> {
    Html(templates::render_index(state.page_size))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /tasks
async fn list_tasks(State(state): State<ServerState>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.db().list_tasks()?;
    debug!(count = tasks.len(), "Listed tasks");
    Ok(Json(tasks))
}

/// POST /tasks
async fn create_task(
    State(state): State<ServerState>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = body.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    input.validated_text()?;

    let task = state.db().create_task(&input)?;
    info!(task_id = %task.id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /tasks/{task_id}
async fn update_task(
    State(state): State<ServerState>,
    Path(task_id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(patch) = body.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    patch.validate()?;

    match state.db().update_task(&task_id, &patch)? {
        Some(task) => {
            info!(task_id = %task.id, completed = task.completed, "Task updated");
            Ok(Json(task))
        }
        None => Err(ApiError::task_not_found(&task_id)),
    }
}

/// DELETE /tasks/{task_id}
async fn delete_task(
    State(state): State<ServerState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state.db().delete_task(&task_id)? {
        return Err(ApiError::task_not_found(&task_id));
    }

    info!(task_id = %task_id, "Task deleted");
    Ok(Json(DeleteResponse {
        message: "Task deleted".to_string(),
        id: task_id,
    }))
}

fn task_routes() -> Router<ServerState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{task_id}", patch(update_task).delete(delete_task))
}

/// Build the router with all routes.
pub fn build_router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page routes
        .route("/", get(root))
        // Task API, also reachable under /api
        .merge(task_routes())
        .nest("/api", task_routes().route("/health", get(health)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for clients of this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            tracing::error!("Server task failed: {}", e);
        }
    }
}

/// Start the HTTP server on `host:port`.
///
/// Port 0 binds an ephemeral port; the handle reports the actual address.
pub async fn start_server(
    state: ServerState,
    host: &str,
    port: u16,
) -> anyhow::Result<ServerHandle> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;

    info!("Server listening on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }
}
