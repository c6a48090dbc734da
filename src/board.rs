//! Board view pipeline.
//!
//! Turns the full task set plus the active filter settings into the visible,
//! deterministically ordered board list. Pure over its inputs; `now` is
//! supplied by the caller so the same snapshot always sorts the same way.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::task::{Priority, Status, Task};

/// Priority facet of the board filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn parse(input: &str) -> Result<PriorityFilter> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(PriorityFilter::All);
        }
        Ok(PriorityFilter::Only(Priority::parse(trimmed)?))
    }

    fn accepts(self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(priority) => task.priority == priority,
        }
    }
}

/// Time facet of the board filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    #[default]
    All,
    Overdue,
    Today,
}

impl TimeFilter {
    pub fn parse(input: &str) -> Result<TimeFilter> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            Ok(TimeFilter::All)
        } else if trimmed.eq_ignore_ascii_case("overdue") {
            Ok(TimeFilter::Overdue)
        } else if trimmed.eq_ignore_ascii_case("today") {
            Ok(TimeFilter::Today)
        } else {
            Err(Error::InvalidArgument(format!(
                "unknown time filter {:?} (expected all, overdue, or today)",
                trimmed
            )))
        }
    }

    fn accepts(self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            TimeFilter::All => true,
            TimeFilter::Overdue => task.is_overdue(now),
            TimeFilter::Today => task.is_due_today(now),
        }
    }
}

/// Produce the visible board list: archived tasks dropped, filters applied,
/// then a stable composite sort. Stability matters; it lets drag-established
/// order survive as the final tiebreak.
pub fn visible_tasks(
    tasks: &[Task],
    priority: PriorityFilter,
    time: TimeFilter,
    now: DateTime<Utc>,
) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|task| !task.is_archived)
        .filter(|task| priority.accepts(task))
        .filter(|task| time.accepts(task, now))
        .cloned()
        .collect();
    visible.sort_by(|left, right| board_ordering(left, right, now));
    visible
}

/// Composite board order: critical first, then heavier priority, then
/// earlier due date with undated tasks last.
fn board_ordering(left: &Task, right: &Task, now: DateTime<Utc>) -> Ordering {
    let left_critical = left.is_critical(now);
    let right_critical = right.is_critical(now);
    right_critical
        .cmp(&left_critical)
        .then_with(|| right.priority.weight().cmp(&left.priority.weight()))
        .then_with(|| due_date_ordering(left.due_date, right.due_date))
}

fn due_date_ordering(left: Option<DateTime<Utc>>, right: Option<DateTime<Utc>>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Tasks of one column, in pipeline order.
pub fn column_tasks<'a>(visible: &'a [Task], column: Status) -> Vec<&'a Task> {
    visible.iter().filter(|task| task.status == column).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap()
    }

    fn task(id: &str, priority: Priority, due: Option<DateTime<Utc>>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            content: String::new(),
            priority,
            status: Status::Todo,
            due_date: due,
            user_id: "user-1".to_string(),
            created_at: at(2024, 1, 1),
            completed_at: None,
            is_archived: false,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_str()).collect()
    }

    #[test]
    fn archived_tasks_never_surface() {
        let mut archived = task("a", Priority::Urgent, None);
        archived.is_archived = true;
        let tasks = vec![archived, task("b", Priority::Normal, None)];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, at(2024, 6, 1));
        assert_eq!(ids(&visible), vec!["b"]);
    }

    #[test]
    fn overdue_normal_outranks_undated_urgent() {
        let tasks = vec![
            task("urgent", Priority::Urgent, None),
            task("overdue", Priority::Normal, Some(at(2024, 1, 1))),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, at(2024, 6, 1));
        assert_eq!(ids(&visible), vec!["overdue", "urgent"]);
    }

    #[test]
    fn weight_breaks_ties_inside_equal_criticality() {
        let tasks = vec![
            task("normal", Priority::Normal, None),
            task("important", Priority::Important, None),
            task("urgent", Priority::Urgent, None),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, at(2024, 6, 1));
        assert_eq!(ids(&visible), vec!["urgent", "important", "normal"]);
    }

    #[test]
    fn earlier_due_date_wins_inside_equal_weight() {
        let now = at(2024, 4, 1);
        let tasks = vec![
            task("later", Priority::Urgent, Some(at(2024, 5, 10))),
            task("sooner", Priority::Urgent, Some(at(2024, 5, 1))),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, now);
        assert_eq!(ids(&visible), vec!["sooner", "later"]);
    }

    #[test]
    fn undated_tasks_sort_after_dated_ones() {
        let now = at(2024, 4, 1);
        let tasks = vec![
            task("undated", Priority::Important, None),
            task("dated", Priority::Important, Some(at(2024, 5, 1))),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, now);
        assert_eq!(ids(&visible), vec!["dated", "undated"]);
    }

    #[test]
    fn list_order_is_the_final_tiebreak() {
        let tasks = vec![
            task("first", Priority::Normal, None),
            task("second", Priority::Normal, None),
            task("third", Priority::Normal, None),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, at(2024, 6, 1));
        assert_eq!(ids(&visible), vec!["first", "second", "third"]);
    }

    #[test]
    fn identical_runs_produce_identical_order() {
        let tasks = vec![
            task("a", Priority::Urgent, Some(at(2024, 5, 1))),
            task("b", Priority::Normal, None),
            task("c", Priority::Important, Some(at(2024, 4, 1))),
            task("d", Priority::Urgent, None),
        ];
        let now = at(2024, 4, 15);
        let first = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, now);
        let second = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, now);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn priority_filter_keeps_only_the_selected_level() {
        let tasks = vec![
            task("a", Priority::Urgent, None),
            task("b", Priority::Normal, None),
            task("c", Priority::Urgent, None),
        ];
        let visible = visible_tasks(
            &tasks,
            PriorityFilter::Only(Priority::Urgent),
            TimeFilter::All,
            at(2024, 6, 1),
        );
        assert_eq!(ids(&visible), vec!["a", "c"]);
    }

    #[test]
    fn overdue_filter_excludes_done_and_undated() {
        let now = at(2024, 6, 1);
        let mut done = task("done", Priority::Normal, Some(at(2024, 1, 1)));
        done.status = Status::Done;
        let tasks = vec![
            done,
            task("undated", Priority::Normal, None),
            task("late", Priority::Normal, Some(at(2024, 1, 1))),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::Overdue, now);
        assert_eq!(ids(&visible), vec!["late"]);
    }

    #[test]
    fn today_filter_keeps_done_tasks_due_today() {
        let now = at(2024, 6, 1);
        let mut done_today = task("done", Priority::Normal, Some(at(2024, 6, 1)));
        done_today.status = Status::Done;
        let tasks = vec![
            done_today,
            task("tomorrow", Priority::Normal, Some(at(2024, 6, 2))),
            task("today", Priority::Normal, Some(at(2024, 6, 1))),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::Today, now);
        assert_eq!(ids(&visible), vec!["today", "done"]);
    }

    #[test]
    fn overdue_urgent_then_plain_task_scenario() {
        let now = at(2024, 6, 1);
        let mut one = task("1", Priority::Urgent, Some(at(2024, 1, 1)));
        let two = task("2", Priority::Normal, None);
        let visible = visible_tasks(
            &[one.clone(), two.clone()],
            PriorityFilter::All,
            TimeFilter::All,
            now,
        );
        assert_eq!(ids(&visible), vec!["1", "2"]);

        one.is_archived = true;
        let visible = visible_tasks(&[one, two], PriorityFilter::All, TimeFilter::All, now);
        assert_eq!(ids(&visible), vec!["2"]);
    }

    #[test]
    fn filters_parse_cli_tokens() {
        assert_eq!(PriorityFilter::parse("all").unwrap(), PriorityFilter::All);
        assert_eq!(
            PriorityFilter::parse("urgent").unwrap(),
            PriorityFilter::Only(Priority::Urgent)
        );
        assert!(PriorityFilter::parse("someday").is_err());
        assert_eq!(TimeFilter::parse("overdue").unwrap(), TimeFilter::Overdue);
        assert_eq!(TimeFilter::parse("Today").unwrap(), TimeFilter::Today);
        assert!(TimeFilter::parse("this-week").is_err());
    }

    #[test]
    fn columns_split_preserves_pipeline_order() {
        let now = at(2024, 6, 1);
        let mut doing = task("doing", Priority::Important, None);
        doing.status = Status::Doing;
        let tasks = vec![
            task("t1", Priority::Normal, None),
            doing,
            task("t2", Priority::Urgent, None),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, now);
        let todo: Vec<&str> = column_tasks(&visible, Status::Todo)
            .into_iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(todo, vec!["t2", "t1"]);
        assert_eq!(column_tasks(&visible, Status::Doing).len(), 1);
        assert_eq!(column_tasks(&visible, Status::Done).len(), 0);
    }

    #[test]
    fn due_today_counts_as_critical_and_leads() {
        let now = at(2024, 6, 1);
        let tasks = vec![
            task("undated-urgent", Priority::Urgent, None),
            task("today-normal", Priority::Normal, Some(at(2024, 6, 1))),
        ];
        let visible = visible_tasks(&tasks, PriorityFilter::All, TimeFilter::All, now);
        assert_eq!(ids(&visible), vec!["today-normal", "undated-urgent"]);
    }
}
