//! mkan archive and history command implementations.

use chrono::Utc;

use crate::cli::{CommandContext, TaskView};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

pub fn run_archive(ctx: &CommandContext, task_id: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    let task = session.archive(task_id)?;

    let now = Utc::now();
    let view = TaskView::new(&task, now);
    let mut human = HumanOutput::new("Task archived");
    human.push_summary("id", task.id.clone());
    human.push_summary("title", task.title.clone());
    if let Some(warning) = session.take_sync_warning() {
        human.push_warning(warning);
    }
    human.push_next_step("mkan history");

    emit_success(ctx.output, "archive", &view, Some(&human))
}

#[derive(serde::Serialize)]
struct HistoryReport {
    user: String,
    groups: Vec<WeekReport>,
}

#[derive(serde::Serialize)]
struct WeekReport {
    label: String,
    week_start: String,
    week_end: String,
    count: usize,
    tasks: Vec<TaskView>,
}

pub fn run_history(ctx: &CommandContext) -> Result<()> {
    let session = ctx.open_session()?;
    let groups = session.archive_view()?;
    let now = Utc::now();

    let mut human = HumanOutput::new(format!(
        "Archive history for {} ({} week(s))",
        session.user_id(),
        groups.len()
    ));
    if groups.is_empty() {
        human.push_detail("no archived tasks yet");
    }

    let mut weeks = Vec::new();
    for group in &groups {
        human.push_detail(format!("{} [{}]", group.label, group.tasks.len()));
        for task in &group.tasks {
            human.push_detail(format!("  {} ({})", task.title, task.priority.label()));
        }
        weeks.push(WeekReport {
            label: group.label.clone(),
            week_start: group.week_start.to_string(),
            week_end: group.week_end.to_string(),
            count: group.tasks.len(),
            tasks: group
                .tasks
                .iter()
                .map(|task| TaskView::new(task, now))
                .collect(),
        });
    }

    let report = HistoryReport {
        user: session.user_id().to_string(),
        groups: weeks,
    };
    emit_success(ctx.output, "history", &report, Some(&human))
}
