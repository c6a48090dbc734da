//! mkan task command implementations: add, edit, rm, move, cal.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::calendar::google_calendar_url;
use crate::cli::{CommandContext, TaskView};
use crate::drag::{DragEvent, DropTarget};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::session::{BoardSession, TaskDraft, TaskPatch};
use crate::task::{Priority, Status};

pub struct AddOptions {
    pub title: String,
    pub content: String,
    pub priority: String,
    pub due: Option<String>,
}

pub fn run_add(ctx: &CommandContext, options: AddOptions) -> Result<()> {
    let priority = Priority::parse(&options.priority)?;
    let due_date = options.due.as_deref().map(parse_due).transpose()?;

    let mut session = ctx.open_session()?;
    let now = Utc::now();
    let task = session.create(
        TaskDraft {
            title: options.title,
            content: options.content,
            priority,
            due_date,
        },
        now,
    )?;

    let view = TaskView::new(&task, now);
    let mut human = HumanOutput::new("Task created");
    human.push_summary("id", task.id.clone());
    human.push_summary("priority", task.priority.label());
    if let Some(due) = &view.due_date {
        human.push_summary("due", due.clone());
    }
    push_sync_warning(&mut session, &mut human);
    human.push_next_step("mkan list");

    emit_success(ctx.output, "add", &view, Some(&human))
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
}

pub fn run_edit(ctx: &CommandContext, options: EditOptions) -> Result<()> {
    let priority = options.priority.as_deref().map(Priority::parse).transpose()?;
    let due_date = match (&options.due, options.clear_due) {
        (Some(raw), _) => Some(Some(parse_due(raw)?)),
        (None, true) => Some(None),
        (None, false) => None,
    };

    let patch = TaskPatch {
        title: options.title,
        content: options.content,
        priority,
        due_date,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change: pass --title, --content, --priority, --due, or --clear-due"
                .to_string(),
        ));
    }

    let mut session = ctx.open_session()?;
    let task = session.update(&options.id, patch)?;

    let view = TaskView::new(&task, Utc::now());
    let mut human = HumanOutput::new("Task updated");
    human.push_summary("id", task.id.clone());
    human.push_summary("title", task.title.clone());
    human.push_summary("priority", task.priority.label());
    push_sync_warning(&mut session, &mut human);

    emit_success(ctx.output, "edit", &view, Some(&human))
}

pub fn run_rm(ctx: &CommandContext, task_id: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    session.delete(task_id)?;

    #[derive(serde::Serialize)]
    struct RmReport<'a> {
        id: &'a str,
        deleted: bool,
    }

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("id", task_id);
    push_sync_warning(&mut session, &mut human);

    emit_success(
        ctx.output,
        "rm",
        &RmReport {
            id: task_id,
            deleted: true,
        },
        Some(&human),
    )
}

pub struct MoveOptions {
    pub id: String,
    pub to: Option<String>,
    pub onto: Option<String>,
}

pub fn run_move(ctx: &CommandContext, options: MoveOptions) -> Result<()> {
    let mut session = ctx.open_session()?;
    let now = Utc::now();

    let (task, moved) = match (options.to.as_deref(), options.onto.as_deref()) {
        (Some(column), None) => {
            let status = Status::parse(column)?;
            let task = session.set_status(&options.id, status, now)?;
            (task, true)
        }
        (None, Some(target)) => {
            session.get(&options.id)?;
            session.drag(DragEvent::Start(options.id.clone()), now);
            let moved = session.drag(
                DragEvent::Over {
                    dragged: options.id.clone(),
                    target: DropTarget::Card(target.to_string()),
                },
                now,
            );
            session.drag(DragEvent::End, now);
            (session.get(&options.id)?.clone(), moved)
        }
        _ => {
            return Err(Error::InvalidArgument(
                "pass exactly one of --to <column> or --onto <task-id>".to_string(),
            ));
        }
    };

    #[derive(serde::Serialize)]
    struct MoveReport {
        task: TaskView,
        moved: bool,
    }

    let view = TaskView::new(&task, now);
    let header = if moved {
        format!("Task moved to {}", task.status.column_title())
    } else {
        "No change".to_string()
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("id", task.id.clone());
    human.push_summary("column", task.status.key());
    if !moved {
        human.push_warning("no move applied (target missing or already in place)");
    }
    push_sync_warning(&mut session, &mut human);

    emit_success(
        ctx.output,
        "move",
        &MoveReport { task: view, moved },
        Some(&human),
    )
}

pub fn run_cal(ctx: &CommandContext, task_id: &str) -> Result<()> {
    let session = ctx.open_session()?;
    let task = session.get(task_id)?;
    let url = google_calendar_url(task).ok_or_else(|| {
        Error::InvalidArgument(format!("task {task_id} has no due date"))
    })?;

    #[derive(serde::Serialize)]
    struct CalReport<'a> {
        id: &'a str,
        url: &'a str,
    }

    let mut human = HumanOutput::new("Calendar link");
    human.push_summary("id", task_id);
    human.push_detail(url.clone());

    emit_success(
        ctx.output,
        "cal",
        &CalReport {
            id: task_id,
            url: &url,
        },
        Some(&human),
    )
}

/// Parse a due date: a plain date becomes midnight UTC of that day.
fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!(
            "invalid due date {:?} (expected YYYY-MM-DD or RFC 3339)",
            trimmed
        ))
    })?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn push_sync_warning(session: &mut BoardSession, human: &mut HumanOutput) {
    if let Some(warning) = session.take_sync_warning() {
        human.push_warning(warning);
    }
}
