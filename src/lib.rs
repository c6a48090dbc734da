//! mkan - Micro kanban Library
//!
//! This library provides the core functionality for the mkan CLI tool,
//! a personal task board with weekly work history.
//!
//! # Core Concepts
//!
//! - **Board**: one ordered task list per user, partitioned into the three
//!   columns todo, doing, and done
//! - **Drag engine**: a gesture state machine that reorders the list and
//!   moves tasks between columns the way a pointer drag would
//! - **Write-through**: every mutation lands in memory first and is then
//!   offered to the backend; failures warn instead of rolling back
//! - **Archive**: done tasks retired from the board into Monday-to-Sunday
//!   week buckets of work history
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `task`: Task model, priority and status lookup tables
//! - `store`: Ordered in-memory task list
//! - `drag`: Drag-reorder gesture engine
//! - `board`: Filter and sort pipeline for the visible board
//! - `archive`: Weekly grouping of archived tasks
//! - `stats`: Board statistics
//! - `report`: Weekly summary text
//! - `calendar`: Google Calendar link building
//! - `session`: Board session tying store, engine, and backend together
//! - `backend`: Persistence trait and the in-memory test backend
//! - `storage`: Data directory, file locking, and the file backend
//! - `output`: Human and JSON output envelopes
//! - `config`: Configuration loading from `config.toml`
//! - `user`: User identity resolution
//! - `error`: Error types and result aliases

pub mod archive;
pub mod backend;
pub mod board;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod drag;
pub mod error;
pub mod output;
pub mod report;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task;
pub mod user;

pub use error::{Error, Result};
