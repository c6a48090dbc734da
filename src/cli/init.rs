//! mkan init command implementation
//!
//! Creates the data directory and a default config file.

use std::path::PathBuf;

use crate::cli::CommandContext;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    data_dir: bool,
    config: bool,
}

pub fn run(ctx: &CommandContext) -> Result<()> {
    let created_dir = !ctx.data_dir.root().exists();
    ctx.data_dir.ensure_exists()?;
    let created_config = ensure_config(ctx)?;

    let report = InitReport {
        data_dir: ctx.data_dir.root().to_path_buf(),
        created: InitCreated {
            data_dir: created_dir,
            config: created_config,
        },
    };

    let mut created_items = Vec::new();
    if created_dir {
        created_items.push("data directory");
    }
    if created_config {
        created_items.push("config.toml");
    }

    let header = if created_items.is_empty() {
        "mkan init: nothing to do".to_string()
    } else {
        "mkan init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("data dir", ctx.data_dir.root().display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("mkan user set <id>");
    human.push_next_step("mkan add \"<title>\"");

    emit_success(ctx.output, "init", &report, Some(&human))?;

    Ok(())
}

fn ensure_config(ctx: &CommandContext) -> Result<bool> {
    let config_path = ctx.data_dir.config_file();
    if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::OperationFailed(format!(
                "config.toml exists but is not a file: {}",
                config_path.display()
            )));
        }
        return Ok(false);
    }

    let config = Config::default();
    config.save(&config_path)?;
    Ok(true)
}
