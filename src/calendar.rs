//! Google Calendar link generation.
//!
//! Builds a prefilled event-creation URL for a task's due date. Events
//! default to one hour starting at the exact due instant.

use chrono::{DateTime, Duration, Utc};

use crate::task::Task;

const RENDER_URL: &str = "https://www.google.com/calendar/render";

/// Event URL for the task, or `None` when it has no due date.
pub fn google_calendar_url(task: &Task) -> Option<String> {
    let start = task.due_date?;
    let end = start + Duration::hours(1);
    Some(format!(
        "{}?action=TEMPLATE&text={}&details={}&dates={}/{}",
        RENDER_URL,
        urlencoding::encode(&task.title),
        urlencoding::encode(&task.content),
        gcal_timestamp(start),
        gcal_timestamp(end)
    ))
}

/// Compact UTC timestamp in the `YYYYMMDDTHHMMSSZ` shape the render endpoint
/// expects.
fn gcal_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}
