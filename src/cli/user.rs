//! mkan user command implementations.

use crate::cli::CommandContext;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::user::persist_user;

#[derive(serde::Serialize)]
struct UserReport {
    user: String,
}

pub fn run_set(ctx: &CommandContext, user_id: &str) -> Result<()> {
    persist_user(&ctx.data_dir, user_id)?;

    let mut human = HumanOutput::new("User set");
    human.push_summary("user", user_id.trim());
    human.push_next_step("mkan add \"<title>\"");

    emit_success(
        ctx.output,
        "user set",
        &UserReport {
            user: user_id.trim().to_string(),
        },
        Some(&human),
    )
}

pub fn run_show(ctx: &CommandContext) -> Result<()> {
    let user = ctx.user()?;

    let mut human = HumanOutput::new("Current user");
    human.push_summary("user", user.clone());

    emit_success(ctx.output, "user show", &UserReport { user }, Some(&human))
}
