//! In-memory task store.
//!
//! Owns the ordered task list for one user's session. The list order is
//! meaningful: drag moves rearrange it, and the board sort uses it as the
//! final tiebreak. The store is plain data owned by whoever builds it; there
//! is no process-wide instance.

use crate::task::Task;

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Replace the whole list, as after a bulk load from the backend.
    pub fn load(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// Index of a task in the ordered list.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Replace an existing task in place (order preserved) or append a new
    /// one.
    pub fn upsert(&mut self, task: Task) {
        match self.position(&task.id) {
            Some(index) => self.tasks[index] = task,
            None => self.tasks.push(task),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Move the task at `from` so it occupies `to`, shifting everything in
    /// between by one slot. Out-of-range `from` is ignored.
    pub fn array_move(&mut self, from: usize, to: usize) {
        if from == to || from >= self.tasks.len() {
            return;
        }
        let task = self.tasks.remove(from);
        let to = to.min(self.tasks.len());
        self.tasks.insert(to, task);
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }
}
