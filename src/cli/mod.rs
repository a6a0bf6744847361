//! CLI command definitions for task-board
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod client;

use crate::board::Filter;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Task filter for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FilterArg {
    /// Every task
    #[default]
    All,
    /// Completed tasks only
    Completed,
    /// Tasks not yet completed
    Incomplete,
}

impl From<FilterArg> for Filter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Filter::All,
            FilterArg::Completed => Filter::Completed,
            FilterArg::Incomplete => Filter::Incomplete,
        }
    }
}

/// Task board server and client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database connection URI (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Server base URL for client commands (default: derived from config)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve(ServeArgs),

    /// List tasks
    List(ListArgs),

    /// Add a task
    Add(AddArgs),

    /// Edit a task's text, name or email
    Edit(EditArgs),

    /// Toggle a task's completed flag
    Toggle(TaskIdArg),

    /// Delete a task
    Delete(TaskIdArg),
}

/// Arguments for the serve subcommand
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the list subcommand
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Which tasks to show
    #[arg(short, long, value_enum, default_value_t = FilterArg::All)]
    pub filter: FilterArg,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

/// Arguments for the add subcommand
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Submitter name
    #[arg(long)]
    pub name: Option<String>,

    /// Submitter email
    #[arg(long)]
    pub email: Option<String>,
}

/// Arguments for the edit subcommand
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task id
    #[arg(value_name = "ID")]
    pub id: String,

    /// New task text
    #[arg(long)]
    pub text: Option<String>,

    /// New submitter name
    #[arg(long)]
    pub name: Option<String>,

    /// New submitter email
    #[arg(long)]
    pub email: Option<String>,
}

/// A single task id argument
#[derive(Args, Debug)]
pub struct TaskIdArg {
    /// Task id
    #[arg(value_name = "ID")]
    pub id: String,
}
