//! mkan list and board command implementations.

use chrono::Utc;

use crate::board::{column_tasks, PriorityFilter, TimeFilter};
use crate::cli::{CommandContext, TaskView};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::task::Status;

#[derive(serde::Serialize)]
struct ListReport {
    user: String,
    count: usize,
    tasks: Vec<TaskView>,
}

pub fn run_list(ctx: &CommandContext, priority: &str, due: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    session.priority_filter = PriorityFilter::parse(priority)?;
    session.time_filter = TimeFilter::parse(due)?;

    let now = Utc::now();
    let visible = session.visible(now);
    let views: Vec<TaskView> = visible.iter().map(|task| TaskView::new(task, now)).collect();

    let mut human = HumanOutput::new(format!(
        "{} task(s) on {}'s board",
        views.len(),
        session.user_id()
    ));
    for view in &views {
        human.push_detail(view.list_line());
    }
    if views.is_empty() {
        human.push_next_step("mkan add \"<title>\"");
    }

    let report = ListReport {
        user: session.user_id().to_string(),
        count: views.len(),
        tasks: views,
    };
    emit_success(ctx.output, "list", &report, Some(&human))
}

#[derive(serde::Serialize)]
struct BoardReport {
    user: String,
    columns: Vec<ColumnReport>,
}

#[derive(serde::Serialize)]
struct ColumnReport {
    status: String,
    title: String,
    count: usize,
    tasks: Vec<TaskView>,
}

pub fn run_board(ctx: &CommandContext, priority: &str, due: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    session.priority_filter = PriorityFilter::parse(priority)?;
    session.time_filter = TimeFilter::parse(due)?;

    let now = Utc::now();
    let visible = session.visible(now);

    let mut human = HumanOutput::new(format!("Board for {}", session.user_id()));
    let mut columns = Vec::new();
    for status in Status::ALL {
        let tasks = column_tasks(&visible, status);
        human.push_detail(format!("{} [{}]", status.column_title(), tasks.len()));
        for task in &tasks {
            human.push_detail(format!("  {}", TaskView::new(task, now).list_line()));
        }
        columns.push(ColumnReport {
            status: status.key().to_string(),
            title: status.column_title().to_string(),
            count: tasks.len(),
            tasks: tasks
                .into_iter()
                .map(|task| TaskView::new(task, now))
                .collect(),
        });
    }

    let report = BoardReport {
        user: session.user_id().to_string(),
        columns,
    };
    emit_success(ctx.output, "board", &report, Some(&human))
}
