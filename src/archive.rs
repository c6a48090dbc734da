//! Weekly archive history.
//!
//! Archived tasks are bucketed into Monday-to-Sunday weeks keyed by their
//! completion time (creation time for tasks that never recorded one), newest
//! week first, newest task first inside each week.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::task::Task;

/// One week of archived work.
#[derive(Debug, Clone, Serialize)]
pub struct WeekGroup {
    pub label: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Monday and Sunday of the week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = u64::from(date.weekday().num_days_from_monday());
    let monday = date.checked_sub_days(Days::new(back)).unwrap_or(date);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
    (monday, sunday)
}

/// Human label for the week containing `date`.
///
/// The week number is ISO 8601 (week 1 holds the year's first Thursday); the
/// year shown is the Monday's calendar year, so the week spanning a new year
/// keeps the old year in its label.
pub fn week_label(date: NaiveDate) -> String {
    let (monday, sunday) = week_range(date);
    format!(
        "{}年 第{}週 ({}/{} - {}/{})",
        monday.year(),
        monday.iso_week().week(),
        monday.month(),
        monday.day(),
        sunday.month(),
        sunday.day()
    )
}

/// Partition archived tasks into week groups, newest first.
///
/// Tasks are pre-sorted descending by completion anchor, so each week's
/// members are contiguous and groups fall out in first-seen order.
pub fn group_archived_by_week(tasks: &[Task]) -> Vec<WeekGroup> {
    let mut sorted: Vec<Task> = tasks.to_vec();
    sorted.sort_by(|left, right| right.history_anchor().cmp(&left.history_anchor()));

    let mut groups: Vec<WeekGroup> = Vec::new();
    for task in sorted {
        let (monday, sunday) = week_range(task.history_anchor().date_naive());
        match groups.last_mut() {
            Some(group) if group.week_start == monday => group.tasks.push(task),
            _ => groups.push(WeekGroup {
                label: week_label(monday),
                week_start: monday,
                week_end: sunday,
                tasks: vec![task],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Status};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 10, 0, 0).unwrap()
    }

    fn archived(id: &str, completed: Option<DateTime<Utc>>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            content: String::new(),
            priority: Priority::Normal,
            status: Status::Done,
            due_date: None,
            user_id: "user-1".to_string(),
            created_at: at(2023, 12, 1),
            completed_at: completed,
            is_archived: true,
        }
    }

    fn labels(groups: &[WeekGroup]) -> Vec<&str> {
        groups.iter().map(|group| group.label.as_str()).collect()
    }

    #[test]
    fn monday_and_sunday_share_one_week() {
        let groups = group_archived_by_week(&[
            archived("mon", Some(at(2024, 1, 1))),
            archived("sun", Some(at(2024, 1, 7))),
            archived("next", Some(at(2024, 1, 8))),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tasks.len(), 1);
        assert_eq!(groups[0].tasks[0].id, "next");
        assert_eq!(groups[1].tasks.len(), 2);
    }

    #[test]
    fn labels_carry_week_number_and_range() {
        assert_eq!(
            week_label(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
            "2024年 第1週 (1/1 - 1/7)"
        );
        assert_eq!(
            week_label(NaiveDate::from_ymd_opt(2024, 5, 12).unwrap()),
            "2024年 第19週 (5/6 - 5/12)"
        );
    }

    #[test]
    fn year_boundary_week_keeps_mondays_year() {
        // 2024-12-30 is a Monday inside ISO week 1 of 2025.
        assert_eq!(
            week_label(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
            "2024年 第1週 (12/30 - 1/5)"
        );
    }

    #[test]
    fn newest_week_comes_first_and_tasks_sort_newest_first() {
        let groups = group_archived_by_week(&[
            archived("old", Some(at(2024, 4, 2))),
            archived("new-early", Some(at(2024, 5, 6))),
            archived("new-late", Some(at(2024, 5, 8))),
        ]);
        assert_eq!(
            labels(&groups),
            vec!["2024年 第19週 (5/6 - 5/12)", "2024年 第14週 (4/1 - 4/7)"]
        );
        let newest: Vec<&str> = groups[0].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(newest, vec!["new-late", "new-early"]);
    }

    #[test]
    fn creation_time_anchors_tasks_without_completion() {
        let groups = group_archived_by_week(&[archived("never-stamped", None)]);
        assert_eq!(groups.len(), 1);
        // created_at 2023-12-01 is a Friday in the week of Mon 2023-11-27.
        assert_eq!(
            groups[0].week_start,
            NaiveDate::from_ymd_opt(2023, 11, 27).unwrap()
        );
    }

    #[test]
    fn empty_archive_produces_no_groups() {
        assert!(group_archived_by_week(&[]).is_empty());
    }

    #[test]
    fn week_range_wraps_sunday_back_to_monday() {
        let (monday, sunday) = week_range(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        assert_eq!(monday, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(sunday, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    }
}
