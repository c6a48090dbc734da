//! Board session.
//!
//! Ties the in-memory store, the drag engine and a persistence backend into
//! one unit of interactive state for a single user. Mutations land in memory
//! first and write through afterwards; a failed write never rolls the store
//! back, it parks a warning the caller surfaces alongside the result.

use chrono::{DateTime, Utc};

use crate::archive::{group_archived_by_week, WeekGroup};
use crate::backend::TaskBackend;
use crate::board::{visible_tasks, PriorityFilter, TimeFilter};
use crate::drag::{DragEngine, DragEvent};
use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::task::{generate_task_id, CompletionRetention, Priority, Status, Task};

/// Input for creating a task. The session fills in id, owner and creation
/// time.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial edit. `None` fields stay untouched; `due_date: Some(None)` clears
/// an existing due date.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// One user's live board: store, gesture state, filters and the backend the
/// session writes through to.
pub struct BoardSession {
    store: TaskStore,
    engine: DragEngine,
    backend: Box<dyn TaskBackend>,
    user_id: String,
    pub priority_filter: PriorityFilter,
    pub time_filter: TimeFilter,
    retention: CompletionRetention,
    sync_warning: Option<String>,
}

impl BoardSession {
    pub fn new(
        backend: Box<dyn TaskBackend>,
        user_id: impl Into<String>,
        retention: CompletionRetention,
    ) -> Self {
        Self {
            store: TaskStore::new(),
            engine: DragEngine::new(),
            backend,
            user_id: user_id.into(),
            priority_filter: PriorityFilter::All,
            time_filter: TimeFilter::All,
            retention,
            sync_warning: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// All tasks currently loaded, in list order, archived included.
    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn get(&self, task_id: &str) -> Result<&Task> {
        self.store
            .get(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    /// Replace the store contents with the backend's active tasks.
    pub fn load(&mut self) -> Result<()> {
        let tasks = self.backend.list(&self.user_id)?;
        tracing::debug!(user = %self.user_id, count = tasks.len(), "loaded board");
        self.store.load(tasks);
        Ok(())
    }

    /// Create a task owned by this session's user and append it to the list.
    pub fn create(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Result<Task> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArgument("title cannot be empty".to_string()));
        }

        let task = Task {
            id: generate_task_id(),
            title: title.to_string(),
            content: draft.content,
            priority: draft.priority,
            status: Status::Todo,
            due_date: draft.due_date,
            user_id: self.user_id.clone(),
            created_at: now,
            completed_at: None,
            is_archived: false,
        };
        self.store.push(task.clone());
        self.save_through(&task);
        Ok(task)
    }

    /// Apply a partial edit to an existing task.
    pub fn update(&mut self, task_id: &str, patch: TaskPatch) -> Result<Task> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidArgument("title cannot be empty".to_string()));
            }
        }
        let task = self
            .store
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(content) = patch.content {
            task.content = content;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }

        let updated = task.clone();
        self.save_through(&updated);
        Ok(updated)
    }

    /// Move a task to another column directly, outside any drag gesture.
    pub fn set_status(
        &mut self,
        task_id: &str,
        status: Status,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let task = self
            .store
            .get(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        let updated = task.with_status(status, now, self.retention);
        self.store.upsert(updated.clone());
        self.save_through(&updated);
        Ok(updated)
    }

    pub fn delete(&mut self, task_id: &str) -> Result<()> {
        self.store
            .remove(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        if let Err(err) = self.backend.delete(&self.user_id, task_id) {
            self.record_sync_failure("delete", err);
        }
        Ok(())
    }

    /// Move a finished task into the archive. Only `done` tasks qualify.
    pub fn archive(&mut self, task_id: &str) -> Result<Task> {
        let task = self
            .store
            .get(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        if task.status != Status::Done {
            return Err(Error::ArchiveNotDone(task_id.to_string()));
        }

        let mut archived = task.clone();
        archived.is_archived = true;
        self.store.upsert(archived.clone());
        if let Err(err) = self.backend.archive(&self.user_id, task_id) {
            self.record_sync_failure("archive", err);
        }
        Ok(archived)
    }

    /// Feed one drag event through the engine. Ending a gesture persists the
    /// whole list so the backend adopts the new order.
    pub fn drag(&mut self, event: DragEvent, now: DateTime<Utc>) -> bool {
        let ended = event == DragEvent::End;
        let mutated = self
            .engine
            .apply(&mut self.store, event, now, self.retention);
        if ended {
            let active: Vec<Task> = self
                .store
                .tasks()
                .iter()
                .filter(|task| !task.is_archived)
                .cloned()
                .collect();
            if let Err(err) = self.backend.batch_update(&self.user_id, &active) {
                self.record_sync_failure("reorder", err);
            }
        }
        mutated
    }

    pub fn is_dragging(&self) -> bool {
        self.engine.is_dragging()
    }

    /// The board as the user sees it: session filters plus the composite sort.
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<Task> {
        visible_tasks(
            self.store.tasks(),
            self.priority_filter,
            self.time_filter,
            now,
        )
    }

    /// Archived tasks fetched fresh from the backend, grouped by week.
    pub fn archive_view(&self) -> Result<Vec<WeekGroup>> {
        let archived = self.backend.list_archived(&self.user_id)?;
        Ok(group_archived_by_week(&archived))
    }

    /// Hand over the pending write-through warning, clearing it.
    pub fn take_sync_warning(&mut self) -> Option<String> {
        self.sync_warning.take()
    }

    fn save_through(&mut self, task: &Task) {
        if let Err(err) = self.backend.save(&self.user_id, task) {
            self.record_sync_failure("save", err);
        }
    }

    fn record_sync_failure(&mut self, operation: &str, err: Error) {
        tracing::warn!(operation, error = %err, "write-through failed");
        self.sync_warning = Some(format!("failed to sync {operation}: {err}"));
    }
}
