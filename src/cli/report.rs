//! mkan summary and stats command implementations.

use chrono::Utc;

use crate::cli::{CommandContext, TaskView};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::report::summary_text;
use crate::stats::BoardStats;

#[derive(serde::Serialize)]
struct SummaryReport {
    user: String,
    text: String,
}

pub fn run_summary(ctx: &CommandContext) -> Result<()> {
    let session = ctx.open_session()?;
    let text = summary_text(session.tasks());

    if ctx.output.json {
        let report = SummaryReport {
            user: session.user_id().to_string(),
            text,
        };
        return emit_success(ctx.output, "summary", &report, None);
    }

    // The summary is copy-paste text; print it as-is.
    if !ctx.output.quiet {
        println!("{text}");
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct StatsReport {
    user: String,
    total: usize,
    done: usize,
    active: usize,
    overdue: usize,
    due_today: usize,
    urgent: usize,
    important: usize,
    normal: usize,
    completion_percentage: u32,
    focus: Vec<TaskView>,
}

pub fn run_stats(ctx: &CommandContext) -> Result<()> {
    let session = ctx.open_session()?;
    let now = Utc::now();
    let stats = BoardStats::compute(session.tasks(), now);

    let mut human = HumanOutput::new(format!("Board statistics for {}", session.user_id()));
    human.push_summary("total", stats.total.to_string());
    human.push_summary(
        "done",
        format!("{} ({}%)", stats.done, stats.completion_percentage),
    );
    human.push_summary("active", stats.active.to_string());
    human.push_summary("overdue", stats.overdue.to_string());
    human.push_summary("due today", stats.due_today.to_string());
    human.push_summary(
        "by priority",
        format!(
            "urgent {}, important {}, normal {}",
            stats.urgent, stats.important, stats.normal
        ),
    );
    for task in &stats.focus {
        human.push_detail(format!("focus: {} ({})", task.title, task.priority.label()));
    }

    let report = StatsReport {
        user: session.user_id().to_string(),
        total: stats.total,
        done: stats.done,
        active: stats.active,
        overdue: stats.overdue,
        due_today: stats.due_today,
        urgent: stats.urgent,
        important: stats.important,
        normal: stats.normal,
        completion_percentage: stats.completion_percentage,
        focus: stats
            .focus
            .iter()
            .map(|task| TaskView::new(task, now))
            .collect(),
    };
    emit_success(ctx.output, "stats", &report, Some(&human))
}
