//! Task Board
//!
//! Serves the task API and browser page, or acts as a client of a running server.

use anyhow::Result;
use clap::Parser;
use task_board::cli::{Cli, Command, ServeArgs, client};
use task_board::client::HttpTaskApi;
use task_board::config::Config;
use task_board::db::Database;
use task_board::logging::{self, LogTarget};
use task_board::server::{ServerState, start_server};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut config = Config::resolve(cli.config.as_deref())?;

    // CLI overrides
    if let Some(uri) = &cli.database {
        config.server.database_uri = uri.clone();
    }

    match cli.command {
        None => serve(config, ServeArgs::default()).await,
        Some(Command::Serve(args)) => serve(config, args).await,
        Some(command) => {
            let base_url = cli.url.clone().unwrap_or_else(|| config.base_url());
            debug!(%base_url, "Running client command");
            let api = HttpTaskApi::new(base_url);
            let report = client::run(command, &api, config.ui.page_size).await?;
            print!("{}", report.render());
            report.into_result()
        }
    }
}

async fn serve(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!("Starting Task Board v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.server.database_uri);

    let db = Database::connect(&config.server.database_uri)?;
    info!("Database initialized successfully");

    let state = ServerState::new(db.clone(), config.ui.page_size);
    let handle = start_server(state, &config.server.host, config.server.port).await?;
    info!("Task board available at {}", handle.base_url());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    handle.shutdown().await;
    if let Err(e) = db.close() {
        warn!("Failed to close database cleanly: {}", e);
    }
    info!("Stopped");

    Ok(())
}
