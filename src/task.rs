//! Task model for mkan.
//!
//! A task lives in exactly one of three board columns (todo, doing, done),
//! carries a closed priority level, and keeps its completion history when it
//! moves back out of the done column (see [`CompletionRetention`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};

const TASK_ID_PREFIX: &str = "task";

/// Priority level of a task.
///
/// Each level binds a display label, a display color, and an ordinal weight.
/// The bindings are fixed; category and color can never drift apart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    Important,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Normal, Priority::Important, Priority::Urgent];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::Important => "important",
            Priority::Urgent => "urgent",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Priority::Normal => "一般",
            Priority::Important => "重要",
            Priority::Urgent => "緊急",
        }
    }

    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Priority::Normal => "#22c55e",
            Priority::Important => "#eab308",
            Priority::Urgent => "#ef4444",
        }
    }

    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Priority::Normal => 1,
            Priority::Important => 2,
            Priority::Urgent => 3,
        }
    }

    /// Parse a priority from its key. Display labels are accepted as well so
    /// that rows written by older clients still resolve.
    pub fn parse(input: &str) -> Result<Priority> {
        let trimmed = input.trim();
        for priority in Priority::ALL {
            if trimmed.eq_ignore_ascii_case(priority.key()) || trimmed == priority.label() {
                return Ok(priority);
            }
        }
        Err(Error::UnknownPriority(trimmed.to_string()))
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Board column a task currently occupies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    Doing,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::Doing, Status::Done];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Doing => "doing",
            Status::Done => "done",
        }
    }

    /// Column heading shown on the board.
    #[must_use]
    pub const fn column_title(self) -> &'static str {
        match self {
            Status::Todo => "待辦事項 (To-do)",
            Status::Doing => "進行中 (Doing)",
            Status::Done => "已完成 (Done)",
        }
    }

    pub fn parse(input: &str) -> Result<Status> {
        let trimmed = input.trim();
        for status in Status::ALL {
            if trimmed.eq_ignore_ascii_case(status.key()) {
                return Ok(status);
            }
        }
        Err(Error::UnknownStatus(trimmed.to_string()))
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// What happens to `completed_at` when a completed task leaves the done
/// column. The board historically keeps the old timestamp as a record of the
/// last completion; `ClearOnReopen` is the stricter alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionRetention {
    Retain,
    ClearOnReopen,
}

impl CompletionRetention {
    pub fn parse(input: &str) -> Result<CompletionRetention> {
        match input.trim() {
            "retain" => Ok(CompletionRetention::Retain),
            "clear-on-reopen" => Ok(CompletionRetention::ClearOnReopen),
            other => Err(Error::InvalidConfig(format!(
                "unknown completion_retention {:?} (expected \"retain\" or \"clear-on-reopen\")",
                other
            ))),
        }
    }
}

impl Default for CompletionRetention {
    fn default() -> Self {
        CompletionRetention::Retain
    }
}

/// A single task record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub priority: Priority,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_archived: bool,
}

impl Task {
    /// Display color derived from the priority lookup, never stored
    /// authoritatively.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        self.priority.color()
    }

    /// Apply a status change, stamping `completed_at` on the first entry
    /// into done. Pure copy; the original task is untouched.
    ///
    /// Moving a completed task back out of done keeps the old timestamp
    /// under [`CompletionRetention::Retain`] and drops it under
    /// [`CompletionRetention::ClearOnReopen`].
    #[must_use]
    pub fn with_status(
        &self,
        new_status: Status,
        now: DateTime<Utc>,
        retention: CompletionRetention,
    ) -> Task {
        let mut updated = self.clone();
        if new_status == Status::Done && self.status != Status::Done {
            updated.completed_at = Some(now);
        } else if new_status != Status::Done
            && self.status == Status::Done
            && retention == CompletionRetention::ClearOnReopen
        {
            updated.completed_at = None;
        }
        updated.status = new_status;
        updated
    }

    /// True when the task is past its due date. Due dates compare at day
    /// granularity, so a task due today is not overdue until tomorrow.
    /// Done tasks are never overdue.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.status == Status::Done {
            return false;
        }
        match self.due_date {
            Some(due) => now > end_of_day(due),
            None => false,
        }
    }

    /// True when the due date falls on the same calendar date as `now`,
    /// regardless of status.
    #[must_use]
    pub fn is_due_today(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due.date_naive() == now.date_naive(),
            None => false,
        }
    }

    /// Critical tasks float to the top of the board: active and either
    /// overdue or due today.
    #[must_use]
    pub fn is_critical(&self, now: DateTime<Utc>) -> bool {
        self.status != Status::Done && (self.is_overdue(now) || self.is_due_today(now))
    }

    /// Timestamp anchoring the task in archive history: completion time,
    /// falling back to creation time for tasks archived without one.
    #[must_use]
    pub fn history_anchor(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.created_at)
    }
}

/// Generate a fresh task id.
pub fn generate_task_id() -> String {
    format!(
        "{}-{}",
        TASK_ID_PREFIX,
        Ulid::new().to_string().to_ascii_lowercase()
    )
}

/// Last representable instant of the calendar day containing `instant`.
fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .map(|naive| naive.and_utc())
        .unwrap_or(instant)
}
