//! Persistence backend boundary.
//!
//! The session talks to storage through [`TaskBackend`]. Stored rows use the
//! external snake_case schema with string timestamps and empty-string-encoded
//! absent due dates; translation into the typed model happens here, and rows
//! that cannot be translated surface as malformed-record errors instead of
//! being dropped.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::{Priority, Status, Task};

/// Store collaborator the board session persists through.
///
/// `list` returns active rows and `list_archived` the archived ones.
/// `batch_update` replaces the caller's view of the list (used after a drag
/// gesture to persist the final order); rows the caller never loaded are
/// kept as-is.
pub trait TaskBackend {
    fn list(&self, user_id: &str) -> Result<Vec<Task>>;
    fn save(&self, user_id: &str, task: &Task) -> Result<Task>;
    fn delete(&self, user_id: &str, task_id: &str) -> Result<()>;
    fn archive(&self, user_id: &str, task_id: &str) -> Result<()>;
    fn list_archived(&self, user_id: &str) -> Result<Vec<Task>>;
    fn batch_update(&self, user_id: &str, tasks: &[Task]) -> Result<()>;
}

/// Wire shape of one stored row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub color: String,
    pub status: String,
    #[serde(default)]
    pub due_date: String,
    pub user_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub completed_at: String,
    #[serde(default)]
    pub is_archived: bool,
}

impl StoredTask {
    pub fn from_task(task: &Task) -> StoredTask {
        StoredTask {
            id: task.id.clone(),
            title: task.title.clone(),
            content: task.content.clone(),
            category: task.priority.key().to_string(),
            color: task.priority.color().to_string(),
            status: task.status.key().to_string(),
            due_date: task.due_date.map(wire_timestamp).unwrap_or_default(),
            user_id: task.user_id.clone(),
            created_at: wire_timestamp(task.created_at),
            completed_at: task.completed_at.map(wire_timestamp).unwrap_or_default(),
            is_archived: task.is_archived,
        }
    }

    /// Translate a stored row into the typed model.
    ///
    /// `color` is ignored; the priority lookup is authoritative. A row whose
    /// `created_at` is unusable falls back to its completion timestamp, and a
    /// row with neither is malformed.
    pub fn into_task(self) -> Result<Task> {
        let priority = Priority::parse(&self.category)
            .map_err(|_| malformed(&self.id, format!("unknown category {:?}", self.category)))?;
        let status = Status::parse(&self.status)
            .map_err(|_| malformed(&self.id, format!("unknown status {:?}", self.status)))?;

        let due_date = match self.due_date.trim() {
            "" => None,
            raw => Some(
                parse_timestamp(raw)
                    .ok_or_else(|| malformed(&self.id, format!("unreadable due_date {:?}", raw)))?,
            ),
        };
        let completed_at = match self.completed_at.trim() {
            "" => None,
            raw => Some(parse_timestamp(raw).ok_or_else(|| {
                malformed(&self.id, format!("unreadable completed_at {:?}", raw))
            })?),
        };
        let created_at = match parse_timestamp(self.created_at.trim()) {
            Some(instant) => instant,
            None => completed_at.ok_or_else(|| {
                malformed(&self.id, "no usable created_at or completed_at".to_string())
            })?,
        };

        Ok(Task {
            id: self.id,
            title: self.title,
            content: self.content,
            priority,
            status,
            due_date,
            user_id: self.user_id,
            created_at,
            completed_at,
            is_archived: self.is_archived,
        })
    }
}

fn malformed(id: &str, reason: String) -> Error {
    Error::MalformedRecord {
        id: id.to_string(),
        reason,
    }
}

fn wire_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

/// Merge a caller-provided list over the stored rows: provided rows win and
/// define the order, stored rows the caller never saw are appended.
pub fn merge_batch(stored: &[StoredTask], provided: &[Task]) -> Vec<StoredTask> {
    let mut merged: Vec<StoredTask> = provided.iter().map(StoredTask::from_task).collect();
    for row in stored {
        if !provided.iter().any(|task| task.id == row.id) {
            merged.push(row.clone());
        }
    }
    merged
}

/// In-memory backend for tests and throwaway sessions. Interior mutability
/// keeps the trait object shareable under the single-threaded model.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: RefCell<HashMap<String, Vec<StoredTask>>>,
    fail_writes: RefCell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail, for exercising write-through warnings.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }

    pub fn seed(&self, user_id: &str, rows: Vec<StoredTask>) {
        self.rows.borrow_mut().insert(user_id.to_string(), rows);
    }

    fn check_writable(&self) -> Result<()> {
        if *self.fail_writes.borrow() {
            return Err(Error::OperationFailed("backend rejected the write".to_string()));
        }
        Ok(())
    }

    fn collect(&self, user_id: &str, archived: bool) -> Result<Vec<Task>> {
        let rows = self.rows.borrow();
        let mut tasks = Vec::new();
        for row in rows.get(user_id).into_iter().flatten() {
            if row.is_archived == archived {
                tasks.push(row.clone().into_task()?);
            }
        }
        Ok(tasks)
    }
}

impl TaskBackend for MemoryBackend {
    fn list(&self, user_id: &str) -> Result<Vec<Task>> {
        self.collect(user_id, false)
    }

    fn save(&self, user_id: &str, task: &Task) -> Result<Task> {
        self.check_writable()?;
        let mut rows = self.rows.borrow_mut();
        let entries = rows.entry(user_id.to_string()).or_default();
        let row = StoredTask::from_task(task);
        match entries.iter().position(|entry| entry.id == task.id) {
            Some(index) => entries[index] = row,
            None => entries.push(row),
        }
        Ok(task.clone())
    }

    fn delete(&self, user_id: &str, task_id: &str) -> Result<()> {
        self.check_writable()?;
        let mut rows = self.rows.borrow_mut();
        if let Some(entries) = rows.get_mut(user_id) {
            entries.retain(|entry| entry.id != task_id);
        }
        Ok(())
    }

    fn archive(&self, user_id: &str, task_id: &str) -> Result<()> {
        self.check_writable()?;
        let mut rows = self.rows.borrow_mut();
        let entries = rows
            .get_mut(user_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        let row = entries
            .iter_mut()
            .find(|entry| entry.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        row.is_archived = true;
        Ok(())
    }

    fn list_archived(&self, user_id: &str) -> Result<Vec<Task>> {
        self.collect(user_id, true)
    }

    fn batch_update(&self, user_id: &str, tasks: &[Task]) -> Result<()> {
        self.check_writable()?;
        let mut rows = self.rows.borrow_mut();
        let entries = rows.entry(user_id.to_string()).or_default();
        *entries = merge_batch(entries, tasks);
        Ok(())
    }
}
