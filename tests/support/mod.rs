use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tasks_file(&self, user: &str) -> PathBuf {
        self.dir.path().join(format!("tasks-{user}.json"))
    }

    /// mkan command bound to this board's data dir and the given user.
    pub fn cmd(&self, user: &str) -> Command {
        let mut cmd = self.cmd_without_user();
        cmd.env("MKAN_USER", user);
        cmd
    }

    /// mkan command bound to the data dir only.
    pub fn cmd_without_user(&self) -> Command {
        let mut cmd = Command::cargo_bin("mkan").expect("binary");
        cmd.env("MKAN_DATA_DIR", self.dir.path());
        cmd.env_remove("MKAN_USER");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Add a task through the CLI and return its generated id.
    pub fn add_task(&self, user: &str, title: &str, extra_args: &[&str]) -> String {
        let output = self
            .cmd(user)
            .args(["add", title, "--json"])
            .args(extra_args)
            .output()
            .expect("run mkan add");
        assert!(
            output.status.success(),
            "mkan add failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let value: Value = serde_json::from_slice(&output.stdout).expect("add emits JSON");
        value["data"]["id"]
            .as_str()
            .expect("task id in payload")
            .to_string()
    }

    /// Run a command expecting success and parse the JSON envelope.
    pub fn json(&self, user: &str, args: &[&str]) -> Value {
        let output = self
            .cmd(user)
            .args(args)
            .arg("--json")
            .output()
            .expect("run mkan");
        assert!(
            output.status.success(),
            "mkan {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("command emits JSON")
    }
}
