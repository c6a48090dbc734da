//! Board statistics.
//!
//! Aggregated numbers for the dashboard view plus the short "focus" list of
//! tasks that most need attention right now.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::task::{Priority, Status, Task};

const FOCUS_LIMIT: usize = 3;

/// Aggregates over one user's full task set. `done` counts every completed
/// task including archived ones; the active-only numbers exclude archived
/// tasks.
#[derive(Debug, Clone, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub done: usize,
    pub active: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub urgent: usize,
    pub important: usize,
    pub normal: usize,
    pub completion_percentage: u32,
    pub focus: Vec<Task>,
}

impl BoardStats {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> BoardStats {
        let total = tasks.len();
        let done = tasks.iter().filter(|task| task.status == Status::Done).count();
        let mut active: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.status != Status::Done && !task.is_archived)
            .collect();
        let active_count = active.len();

        let overdue = active.iter().filter(|task| task.is_overdue(now)).count();
        let due_today = active
            .iter()
            .filter(|task| task.is_due_today(now) && !task.is_overdue(now))
            .count();

        let count_priority = |priority: Priority| {
            active
                .iter()
                .filter(|task| task.priority == priority)
                .count()
        };
        let urgent = count_priority(Priority::Urgent);
        let important = count_priority(Priority::Important);
        let normal = count_priority(Priority::Normal);

        let completion_percentage = if total == 0 {
            0
        } else {
            ((done as f64 / total as f64) * 100.0).round() as u32
        };

        // Focus list: critical first, then by weight, capped at three.
        active.sort_by(|left, right| {
            let left_critical = left.is_critical(now);
            let right_critical = right.is_critical(now);
            right_critical
                .cmp(&left_critical)
                .then_with(|| right.priority.weight().cmp(&left.priority.weight()))
        });
        let focus: Vec<Task> = active.into_iter().take(FOCUS_LIMIT).cloned().collect();

        BoardStats {
            total,
            done,
            active: active_count,
            overdue,
            due_today,
            urgent,
            important,
            normal,
            completion_percentage,
            focus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap()
    }

    fn task(id: &str, status: Status, priority: Priority) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            content: String::new(),
            priority,
            status,
            due_date: None,
            user_id: "user-1".to_string(),
            created_at: at(2024, 5, 1),
            completed_at: None,
            is_archived: false,
        }
    }

    #[test]
    fn counts_split_done_and_active() {
        let now = at(2024, 6, 1);
        let mut overdue = task("late", Status::Todo, Priority::Urgent);
        overdue.due_date = Some(at(2024, 5, 1));
        let mut today = task("today", Status::Doing, Priority::Important);
        today.due_date = Some(at(2024, 6, 1));
        let mut archived_done = task("gone", Status::Done, Priority::Normal);
        archived_done.is_archived = true;

        let tasks = vec![
            overdue,
            today,
            archived_done,
            task("done", Status::Done, Priority::Normal),
            task("plain", Status::Todo, Priority::Normal),
        ];
        let stats = BoardStats::compute(&tasks, now);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.done, 2);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.urgent, 1);
        assert_eq!(stats.important, 1);
        assert_eq!(stats.normal, 1);
        assert_eq!(stats.completion_percentage, 40);
    }

    #[test]
    fn percentage_rounds_and_handles_empty() {
        let now = at(2024, 6, 1);
        assert_eq!(BoardStats::compute(&[], now).completion_percentage, 0);

        let tasks = vec![
            task("a", Status::Done, Priority::Normal),
            task("b", Status::Todo, Priority::Normal),
            task("c", Status::Todo, Priority::Normal),
        ];
        assert_eq!(BoardStats::compute(&tasks, now).completion_percentage, 33);
    }

    #[test]
    fn focus_puts_critical_ahead_of_heavier_priority() {
        let now = at(2024, 6, 1);
        let mut critical = task("critical", Status::Todo, Priority::Normal);
        critical.due_date = Some(at(2024, 5, 1));
        let tasks = vec![
            task("urgent", Status::Todo, Priority::Urgent),
            critical,
            task("important", Status::Doing, Priority::Important),
            task("plain", Status::Todo, Priority::Normal),
        ];
        let stats = BoardStats::compute(&tasks, now);
        let focus: Vec<&str> = stats.focus.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(focus, vec!["critical", "urgent", "important"]);
    }

    #[test]
    fn focus_excludes_done_and_archived() {
        let now = at(2024, 6, 1);
        let mut archived = task("archived", Status::Todo, Priority::Urgent);
        archived.is_archived = true;
        let tasks = vec![
            archived,
            task("done", Status::Done, Priority::Urgent),
            task("only", Status::Todo, Priority::Normal),
        ];
        let stats = BoardStats::compute(&tasks, now);
        let focus: Vec<&str> = stats.focus.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(focus, vec!["only"]);
    }
}
