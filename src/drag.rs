//! Drag-reorder engine.
//!
//! Translates a drag gesture into task-list mutations, decoupled from any
//! UI event dispatch so gestures can be replayed as plain event sequences.
//!
//! Gesture lifecycle: `Start` picks up a card, repeated `Over` events mutate
//! the store incrementally as the card passes over drop targets, `End` puts
//! the card down. There is no rollback; a cancelled gesture leaves the list
//! exactly as the last `Over` event shaped it.

use chrono::{DateTime, Utc};

use crate::store::TaskStore;
use crate::task::{CompletionRetention, Status};

/// Where a dragged card currently hovers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Over another task's card.
    Card(String),
    /// Over a column's empty area.
    Column(Status),
}

/// One step of a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start(String),
    Over { dragged: String, target: DropTarget },
    End,
}

/// Gesture state machine: idle when `active` is `None`, dragging otherwise.
#[derive(Debug, Clone, Default)]
pub struct DragEngine {
    active: Option<String>,
}

impl DragEngine {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Id of the card currently being dragged, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Feed one gesture event. Returns `true` when the store was mutated.
    ///
    /// Unknown ids and over-events outside a gesture are no-ops: a drop that
    /// resolves to nothing simply fails to produce a mutation.
    pub fn apply(
        &mut self,
        store: &mut TaskStore,
        event: DragEvent,
        now: DateTime<Utc>,
        retention: CompletionRetention,
    ) -> bool {
        match event {
            DragEvent::Start(task_id) => {
                self.active = store.get(&task_id).map(|task| task.id.clone());
                false
            }
            DragEvent::Over { dragged, target } => {
                if !self.is_dragging() {
                    return false;
                }
                match target {
                    DropTarget::Card(target_id) => {
                        self.over_card(store, &dragged, &target_id, now, retention)
                    }
                    DropTarget::Column(status) => {
                        self.over_column(store, &dragged, status, now, retention)
                    }
                }
            }
            DragEvent::End => {
                self.active = None;
                false
            }
        }
    }

    /// Hovering over another card adopts that card's column when it differs,
    /// then moves the dragged card into the target's list slot.
    fn over_card(
        &self,
        store: &mut TaskStore,
        dragged: &str,
        target_id: &str,
        now: DateTime<Utc>,
        retention: CompletionRetention,
    ) -> bool {
        if dragged == target_id {
            return false;
        }
        let (from, to) = match (store.position(dragged), store.position(target_id)) {
            (Some(from), Some(to)) => (from, to),
            _ => return false,
        };

        let target_status = store.tasks()[to].status;
        if store.tasks()[from].status != target_status {
            let updated = store.tasks()[from].with_status(target_status, now, retention);
            store.upsert(updated);
        }
        store.array_move(from, to);
        tracing::debug!(dragged, target = target_id, from, to, "drag move applied");
        true
    }

    /// Hovering over a column's empty area only changes status; the list
    /// order stays as-is.
    fn over_column(
        &self,
        store: &mut TaskStore,
        dragged: &str,
        column: Status,
        now: DateTime<Utc>,
        retention: CompletionRetention,
    ) -> bool {
        let task = match store.get(dragged) {
            Some(task) if task.status != column => task.clone(),
            _ => return false,
        };
        store.upsert(task.with_status(column, now, retention));
        true
    }
}
