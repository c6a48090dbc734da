//! Command-line interface for mkan
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::session::BoardSession;
use crate::storage::{DataDir, FileBackend};
use crate::task::Task;

mod archive;
mod init;
mod report;
mod task;
mod user;
mod view;

/// mkan - Micro kanban
///
/// A personal task board in the terminal: three columns, priority and
/// due-date ordering, drag-style moves, and a weekly work history.
#[derive(Parser, Debug)]
#[command(name = "mkan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "MKAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// User id owning the board
    #[arg(long, global = true, env = "MKAN_USER")]
    pub user: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the data directory and default config
    Init,

    /// Add a task to the to-do column
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long, default_value = "")]
        content: String,

        /// Priority: normal, important, urgent
        #[arg(short, long, default_value = "normal")]
        priority: String,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,
    },

    /// Edit a task's title, content, priority, or due date
    Edit {
        /// Task id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        content: Option<String>,

        /// New priority: normal, important, urgent
        #[arg(long)]
        priority: Option<String>,

        /// New due date (YYYY-MM-DD or RFC 3339)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: String,
    },

    /// Move a task to a column or drop it onto another card
    Move {
        /// Task id
        id: String,

        /// Destination column: todo, doing, done
        #[arg(long, conflicts_with = "onto")]
        to: Option<String>,

        /// Target card; the task adopts its column and list slot
        #[arg(long)]
        onto: Option<String>,
    },

    /// List visible tasks in board order
    List {
        /// Filter by priority: all, normal, important, urgent
        #[arg(long, default_value = "all")]
        priority: String,

        /// Filter by due time: all, overdue, today
        #[arg(long, default_value = "all")]
        due: String,
    },

    /// Show the board as three columns
    Board {
        /// Filter by priority: all, normal, important, urgent
        #[arg(long, default_value = "all")]
        priority: String,

        /// Filter by due time: all, overdue, today
        #[arg(long, default_value = "all")]
        due: String,
    },

    /// Archive a done task
    Archive {
        /// Task id
        id: String,
    },

    /// Show archived tasks grouped by week
    History,

    /// Print the weekly summary text
    Summary,

    /// Show board statistics
    Stats,

    /// Print a Google Calendar link for a task's due date
    Cal {
        /// Task id
        id: String,
    },

    /// Set or show the user identity
    #[command(subcommand)]
    User(UserCommands),
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Set the persisted user id
    Set {
        /// User id
        id: String,
    },

    /// Show the resolved user id
    Show,
}

/// Shared state a board command needs: the resolved data directory, parsed
/// config, and output options. User resolution is deferred so that commands
/// like `init` work without one.
pub(crate) struct CommandContext {
    pub data_dir: DataDir,
    pub config: Config,
    pub output: OutputOptions,
    cli_user: Option<String>,
}

impl CommandContext {
    fn new(
        data_dir: Option<PathBuf>,
        cli_user: Option<String>,
        json: bool,
        quiet: bool,
    ) -> Result<CommandContext> {
        let data_dir = DataDir::resolve(data_dir.as_deref())?;
        let config = Config::try_load(&data_dir)?;
        Ok(CommandContext {
            data_dir,
            config,
            output: OutputOptions { json, quiet },
            cli_user,
        })
    }

    /// Resolve the user id for this invocation.
    pub fn user(&self) -> Result<String> {
        crate::user::resolve_user(&self.data_dir, self.cli_user.as_deref())
    }

    /// Open a loaded session on the resolved user's board.
    pub fn open_session(&self) -> Result<BoardSession> {
        let user_id = self.user()?;
        let backend = FileBackend::new(
            self.data_dir.clone(),
            self.config.storage.lock_timeout_ms,
        );
        let mut session = BoardSession::new(
            Box::new(backend),
            user_id,
            self.config.completion_retention()?,
        );
        session.load()?;
        Ok(session)
    }
}

/// Task as printed by the CLI: lookup-derived display fields inlined,
/// timestamps as RFC 3339 strings, board flags computed against "now".
#[derive(Debug, serde::Serialize)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub priority: String,
    pub priority_label: String,
    pub color: String,
    pub status: String,
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub is_archived: bool,
    pub overdue: bool,
    pub due_today: bool,
}

impl TaskView {
    pub fn new(task: &Task, now: DateTime<Utc>) -> TaskView {
        TaskView {
            id: task.id.clone(),
            title: task.title.clone(),
            content: task.content.clone(),
            priority: task.priority.key().to_string(),
            priority_label: task.priority.label().to_string(),
            color: task.color().to_string(),
            status: task.status.key().to_string(),
            column: task.status.column_title().to_string(),
            due_date: task.due_date.map(view_timestamp),
            created_at: view_timestamp(task.created_at),
            completed_at: task.completed_at.map(view_timestamp),
            is_archived: task.is_archived,
            overdue: task.is_overdue(now),
            due_today: task.is_due_today(now),
        }
    }

    /// One-line rendering for human lists.
    pub fn list_line(&self) -> String {
        let mut line = format!("[{}] {} ({})", self.status, self.title, self.priority);
        if let Some(due) = &self.due_date {
            line.push_str(&format!(" due {}", &due[..10]));
        }
        if self.overdue {
            line.push_str(" OVERDUE");
        } else if self.due_today {
            line.push_str(" TODAY");
        }
        line.push_str(&format!("  {}", self.id));
        line
    }
}

fn view_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = CommandContext::new(self.data_dir, self.user, self.json, self.quiet)?;
        match self.command {
            Commands::Init => init::run(&ctx),
            Commands::Add {
                title,
                content,
                priority,
                due,
            } => task::run_add(
                &ctx,
                task::AddOptions {
                    title,
                    content,
                    priority,
                    due,
                },
            ),
            Commands::Edit {
                id,
                title,
                content,
                priority,
                due,
                clear_due,
            } => task::run_edit(
                &ctx,
                task::EditOptions {
                    id,
                    title,
                    content,
                    priority,
                    due,
                    clear_due,
                },
            ),
            Commands::Rm { id } => task::run_rm(&ctx, &id),
            Commands::Move { id, to, onto } => {
                task::run_move(&ctx, task::MoveOptions { id, to, onto })
            }
            Commands::List { priority, due } => view::run_list(&ctx, &priority, &due),
            Commands::Board { priority, due } => view::run_board(&ctx, &priority, &due),
            Commands::Archive { id } => archive::run_archive(&ctx, &id),
            Commands::History => archive::run_history(&ctx),
            Commands::Summary => report::run_summary(&ctx),
            Commands::Stats => report::run_stats(&ctx),
            Commands::Cal { id } => task::run_cal(&ctx, &id),
            Commands::User(cmd) => match cmd {
                UserCommands::Set { id } => user::run_set(&ctx, &id),
                UserCommands::Show => user::run_show(&ctx),
            },
        }
    }
}
