//! Weekly work summary.
//!
//! Renders the current board as the three-section plain-text record people
//! paste into weekly reports. Archived tasks are left out; within each
//! section tasks keep their list order.

use crate::task::{Status, Task};

const EMPTY_SECTION: &str = "(無)";

/// Build the summary text for one user's task list.
pub fn summary_text(tasks: &[Task]) -> String {
    let mut text = String::new();
    push_section(&mut text, "一、本週已完成的工作事項及內容", tasks, Status::Done);
    text.push('\n');
    push_section(&mut text, "二、本週進行中的工作事項及內容", tasks, Status::Doing);
    text.push('\n');
    push_section(&mut text, "三、待辦的工作事項及內容", tasks, Status::Todo);
    text
}

fn push_section(text: &mut String, heading: &str, tasks: &[Task], status: Status) {
    text.push_str(heading);
    text.push('\n');

    let mut line = 0usize;
    for task in tasks {
        if task.status != status || task.is_archived {
            continue;
        }
        line += 1;
        if task.content.is_empty() {
            text.push_str(&format!("{}. {}\n", line, task.title));
        } else {
            text.push_str(&format!("{}. {} - {}\n", line, task.title, task.content));
        }
    }
    if line == 0 {
        text.push_str(EMPTY_SECTION);
        text.push('\n');
    }
}
