//! Board behaviour against real and failing task APIs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use task_board::board::{Filter, NoticeLevel, TaskBoard};
use task_board::cli::client;
use task_board::cli::{AddArgs, Command, EditArgs, FilterArg, ListArgs, TaskIdArg};
use task_board::client::{ClientError, HttpTaskApi, TaskApi};
use task_board::db::Database;
use task_board::server::{ServerState, start_server};
use task_board::types::{NewTask, Task, TaskPatch};

fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

/// Wraps a store and rejects every mutation while `reject` is set.
struct FlakyApi {
    inner: Database,
    reject: AtomicBool,
}

impl FlakyApi {
    fn new(inner: Database) -> Self {
        Self {
            inner,
            reject: AtomicBool::new(false),
        }
    }

    fn check(&self) -> Result<(), ClientError> {
        if self.reject.load(Ordering::SeqCst) {
            Err(ClientError::Api {
                status: 500,
                code: Some("DATABASE_ERROR".to_string()),
                message: "database is locked".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TaskApi for FlakyApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        self.inner.list().await
    }

    async fn create(&self, input: &NewTask) -> Result<Task, ClientError> {
        self.check()?;
        self.inner.create(input).await
    }

    async fn update(&self, task_id: &str, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.check()?;
        self.inner.update(task_id, patch).await
    }

    async fn delete(&self, task_id: &str) -> Result<(), ClientError> {
        self.check()?;
        self.inner.delete(task_id).await
    }
}

fn ids(board: &TaskBoard) -> Vec<String> {
    board.tasks().iter().map(|t| t.id.clone()).collect()
}

mod optimistic_tests {
    use super::*;

    #[tokio::test]
    async fn rejected_delete_keeps_both_tasks() {
        let db = setup_db();
        let a = db.create_task(&NewTask::new("A")).unwrap();
        let b = db.create_task(&NewTask::new("B")).unwrap();
        let api = FlakyApi::new(db.clone());
        let mut board = TaskBoard::load(&api, 5).await.unwrap();

        api.reject.store(true, Ordering::SeqCst);
        let notice = board.delete(&api, &a.id).await;

        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Failed to delete task: database is locked");
        assert_eq!(ids(&board), vec![a.id.clone(), b.id.clone()]);
        assert_eq!(db.list_tasks().unwrap().len(), 2);
        assert_eq!(board.in_flight(), 0);
    }

    #[tokio::test]
    async fn accepted_delete_removes_task() {
        let db = setup_db();
        let a = db.create_task(&NewTask::new("A")).unwrap();
        let b = db.create_task(&NewTask::new("B")).unwrap();
        let mut board = TaskBoard::load(&db, 5).await.unwrap();

        let notice = board.delete(&db, &a.id).await;

        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(ids(&board), vec![b.id]);
    }

    #[tokio::test]
    async fn rejected_add_leaves_no_provisional_row() {
        let api = FlakyApi::new(setup_db());
        let mut board = TaskBoard::load(&api, 5).await.unwrap();

        api.reject.store(true, Ordering::SeqCst);
        let notice = board.add(&api, NewTask::new("Buy milk")).await;

        assert!(notice.is_error());
        assert!(board.tasks().is_empty());
    }

    #[tokio::test]
    async fn confirmed_add_uses_server_id() {
        let db = setup_db();
        let mut board = TaskBoard::load(&db, 5).await.unwrap();

        let notice = board
            .add(&db, NewTask::new("Buy milk").with_email("ann@example.com"))
            .await;

        assert_eq!(notice.message, "Task added successfully!");
        assert_eq!(board.tasks(), db.list_tasks().unwrap().as_slice());
        assert_eq!(board.tasks()[0].email, "ann@example.com");
    }

    #[tokio::test]
    async fn toggle_round_trips_through_store() {
        let db = setup_db();
        let task = db.create_task(&NewTask::new("A")).unwrap();
        let mut board = TaskBoard::load(&db, 5).await.unwrap();

        let notice = board.toggle(&db, &task.id).await;
        assert_eq!(notice.message, "Task marked as complete.");
        assert!(db.get_task(&task.id).unwrap().unwrap().completed);

        let notice = board.toggle(&db, &task.id).await;
        assert_eq!(notice.message, "Task unmarked as complete.");
        assert!(!db.get_task(&task.id).unwrap().unwrap().completed);
        assert!(!board.get(&task.id).unwrap().completed);
    }

    #[tokio::test]
    async fn task_deleted_elsewhere_rolls_back_toggle() {
        let db = setup_db();
        let task = db.create_task(&NewTask::new("A")).unwrap();
        let mut board = TaskBoard::load(&db, 5).await.unwrap();
        db.delete_task(&task.id).unwrap();

        let notice = board.toggle(&db, &task.id).await;

        assert!(notice.is_error());
        assert!(notice.message.contains("Task not found"));
        assert!(!board.get(&task.id).unwrap().completed);
    }
}

mod edit_tests {
    use super::*;

    #[tokio::test]
    async fn saved_draft_sends_only_changes() {
        let db = setup_db();
        let task = db
            .create_task(&NewTask::new("Buy milk").with_name("Ann"))
            .unwrap();
        db.update_task(&task.id, &TaskPatch::completed(true)).unwrap();
        let mut board = TaskBoard::load(&db, 5).await.unwrap();

        let mut draft = board.begin_edit(&task.id).unwrap();
        draft.text = "Buy oat milk".to_string();
        let notice = board.save_edit(&db, draft).await;

        assert_eq!(notice.message, "Task updated successfully!");
        let stored = db.get_task(&task.id).unwrap().unwrap();
        assert_eq!(stored.text, "Buy oat milk");
        assert_eq!(stored.name, "Ann");
        assert!(stored.completed);
    }

    #[tokio::test]
    async fn cancelled_draft_changes_nothing() {
        let db = setup_db();
        let task = db.create_task(&NewTask::new("Buy milk")).unwrap();
        let board = TaskBoard::load(&db, 5).await.unwrap();

        let mut draft = board.begin_edit(&task.id).unwrap();
        draft.text = "Something else".to_string();
        drop(draft);

        assert_eq!(board.get(&task.id).unwrap().text, "Buy milk");
        assert_eq!(db.get_task(&task.id).unwrap().unwrap().text, "Buy milk");
    }

    #[tokio::test]
    async fn rejected_edit_restores_text() {
        let db = setup_db();
        let task = db.create_task(&NewTask::new("Buy milk")).unwrap();
        let api = FlakyApi::new(db);
        let mut board = TaskBoard::load(&api, 5).await.unwrap();

        api.reject.store(true, Ordering::SeqCst);
        let mut draft = board.begin_edit(&task.id).unwrap();
        draft.text = "Buy oat milk".to_string();
        let notice = board.save_edit(&api, draft).await;

        assert_eq!(notice.message, "Failed to update task: database is locked");
        assert_eq!(board.get(&task.id).unwrap().text, "Buy milk");
    }
}

mod cli_client_tests {
    use super::*;

    #[tokio::test]
    async fn add_then_list_completed() {
        let db = setup_db();

        let report = client::run(
            Command::Add(AddArgs {
                text: "Buy milk".to_string(),
                name: Some("Ann".to_string()),
                email: None,
            }),
            &db,
            5,
        )
        .await
        .unwrap();
        assert!(!report.is_error());
        let id = report.board.tasks()[0].id.clone();

        let report = client::run(Command::Toggle(TaskIdArg { id: id.clone() }), &db, 5)
            .await
            .unwrap();
        assert!(report.render().contains("Task marked as complete."));

        let report = client::run(
            Command::List(ListArgs {
                filter: FilterArg::Completed,
                page: 1,
            }),
            &db,
            5,
        )
        .await
        .unwrap();
        assert_eq!(report.board.filter(), Filter::Completed);
        assert_eq!(report.board.visible().len(), 1);
        assert!(report.render().contains("[x]"));
    }

    #[tokio::test]
    async fn edit_unknown_task_fails() {
        let db = setup_db();

        let result = client::run(
            Command::Edit(EditArgs {
                id: "missing".to_string(),
                text: Some("x".to_string()),
                name: None,
                email: None,
            }),
            &db,
            5,
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_reports_error_for_unknown_task() {
        let db = setup_db();

        let report = client::run(Command::Delete(TaskIdArg { id: "missing".to_string() }), &db, 5)
            .await
            .unwrap();

        assert!(report.is_error());
        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Task not found: missing");
    }

    #[tokio::test]
    async fn successful_command_is_ok() {
        let db = setup_db();

        let report = client::run(
            Command::Add(AddArgs {
                text: "Buy milk".to_string(),
                name: None,
                email: None,
            }),
            &db,
            5,
        )
        .await
        .unwrap();

        assert!(report.into_result().is_ok());
    }
}

mod http_client_tests {
    use super::*;

    #[tokio::test]
    async fn board_drives_running_server() {
        let db = setup_db();
        let server = start_server(ServerState::new(db.clone(), 5), "127.0.0.1", 0)
            .await
            .unwrap();
        let api = HttpTaskApi::new(server.base_url());

        let mut board = TaskBoard::load(&api, 5).await.unwrap();
        let notice = board.add(&api, NewTask::new("Buy milk")).await;
        assert_eq!(notice.level, NoticeLevel::Success);

        let id = board.tasks()[0].id.clone();
        board.toggle(&api, &id).await;
        assert!(db.get_task(&id).unwrap().unwrap().completed);

        board.delete(&api, &id).await;
        assert!(db.list_tasks().unwrap().is_empty());

        let err = api.delete(&id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.server_message(), Some(format!("Task not found: {}", id).as_str()));

        let err = api.create(&NewTask::default()).await.unwrap_err();
        assert_eq!(err.server_message(), Some("text is required"));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn truncated_error_body_is_a_transport_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            // Promise more body than is sent, then hang up.
            let _ = socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\npartial",
                )
                .await;
        });
        let api = HttpTaskApi::new(format!("http://{}", addr));

        let err = api.list().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Bind and drop to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = HttpTaskApi::new(format!("http://127.0.0.1:{}", port));

        let err = TaskBoard::load(&api, 5).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}

mod overlap_tests {
    use super::*;
    use task_board::board::Mutation;

    #[tokio::test]
    async fn rejected_delete_keeps_confirmed_add() {
        let db = setup_db();
        let a = db.create_task(&NewTask::new("A")).unwrap();
        let api = FlakyApi::new(db.clone());
        let mut board = TaskBoard::load(&api, 5).await.unwrap();

        let add = board.apply(Mutation::Add(NewTask::new("Buy milk"))).unwrap();
        let delete = board
            .apply(Mutation::Delete { id: a.id.clone() })
            .unwrap();

        let created = api.create(&NewTask::new("Buy milk")).await.unwrap();
        board.confirm(add, Some(created.clone()));

        api.reject.store(true, Ordering::SeqCst);
        let err = api.delete(&a.id).await.unwrap_err();
        board.roll_back(delete, &err);

        assert_eq!(ids(&board), vec![a.id.clone(), created.id.clone()]);
        assert!(board.tasks().iter().all(|t| !t.id.starts_with("pending-")));

        // The confirmed row is usable right away.
        api.reject.store(false, Ordering::SeqCst);
        let notice = board.toggle(&api, &created.id).await;
        assert_eq!(notice.level, NoticeLevel::Success);
        assert!(db.get_task(&created.id).unwrap().unwrap().completed);
    }
}
