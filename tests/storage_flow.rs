mod support;

use predicates::str::contains;
use support::TestBoard;

fn read_rows(board: &TestBoard, user: &str) -> Vec<serde_json::Value> {
    let raw = std::fs::read_to_string(board.tasks_file(user)).expect("tasks file");
    serde_json::from_str(&raw).expect("rows")
}

#[test]
fn wire_rows_use_the_snake_case_string_schema() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    board.add_task("alice", "Write the report", &["--due", "2099-01-01"]);

    let rows = read_rows(&board, "alice");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["title"], "Write the report");
    assert_eq!(row["category"], "normal");
    assert_eq!(row["color"], "#22c55e");
    assert_eq!(row["status"], "todo");
    assert_eq!(row["due_date"], "2099-01-01T00:00:00.000Z");
    assert_eq!(row["user_id"], "alice");
    assert_eq!(row["completed_at"], "");
    assert_eq!(row["is_archived"], false);

    let created = row["created_at"].as_str().expect("created_at");
    assert!(created.ends_with('Z'));
    assert!(created.contains('.'));
    Ok(())
}

#[test]
fn completion_round_trips_through_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    let id = board.add_task("alice", "Finish it", &[]);
    board.json("alice", &["move", &id, "--to", "done"]);

    let rows = read_rows(&board, "alice");
    assert_eq!(rows[0]["status"], "done");
    let stamp = rows[0]["completed_at"].as_str().expect("completed_at");
    assert!(stamp.ends_with('Z'));

    let list = board.json("alice", &["board"]);
    assert_eq!(list["data"]["columns"][2]["count"], 1);
    Ok(())
}

#[test]
fn reorder_survives_in_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    let first = board.add_task("alice", "First", &[]);
    let second = board.add_task("alice", "Second", &[]);
    board.json("alice", &["move", &second, "--onto", &first]);

    let rows = read_rows(&board, "alice");
    let titles: Vec<&str> = rows
        .iter()
        .map(|row| row["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);
    Ok(())
}

#[test]
fn archived_rows_stay_in_the_same_file() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    let id = board.add_task("alice", "Old work", &[]);
    board.json("alice", &["move", &id, "--to", "done"]);
    board.json("alice", &["archive", &id]);

    let rows = read_rows(&board, "alice");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["is_archived"], true);

    assert_eq!(board.json("alice", &["list"])["data"]["count"], 0);
    let history = board.json("alice", &["history"]);
    assert_eq!(history["data"]["groups"][0]["tasks"][0]["title"], "Old work");
    Ok(())
}

#[test]
fn malformed_rows_fail_loudly() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    let row = serde_json::json!([{
        "id": "task-1",
        "title": "Odd row",
        "content": "",
        "category": "high",
        "color": "",
        "status": "todo",
        "due_date": "",
        "user_id": "alice",
        "created_at": "2024-05-01T09:00:00.000Z",
        "completed_at": "",
        "is_archived": false,
    }]);
    std::fs::write(board.tasks_file("alice"), serde_json::to_string(&row)?)?;

    board
        .cmd("alice")
        .arg("list")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Malformed stored task task-1"));
    Ok(())
}

#[test]
fn unparseable_files_are_operation_failures() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    std::fs::write(board.tasks_file("alice"), "{not json")?;

    board
        .cmd("alice")
        .arg("list")
        .assert()
        .failure()
        .code(4)
        .stderr(contains("JSON error"));
    Ok(())
}

#[test]
fn user_ids_reduce_to_alphanumeric_file_names() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    board.add_task("Alice.Liddell", "Task", &[]);

    assert!(board.path().join("tasks-aliceliddell.json").exists());
    Ok(())
}

#[test]
fn reopening_keeps_the_stamp_under_the_default_config() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    let id = board.add_task("alice", "Flip flop", &[]);
    board.json("alice", &["move", &id, "--to", "done"]);

    let value = board.json("alice", &["move", &id, "--to", "todo"]);
    assert!(value["data"]["task"]["completed_at"].is_string());
    Ok(())
}

#[test]
fn clear_on_reopen_retention_drops_the_stamp() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    std::fs::write(
        board.path().join("config.toml"),
        "[board]\ncompletion_retention = \"clear-on-reopen\"\n",
    )?;
    let id = board.add_task("alice", "Flip flop", &[]);
    board.json("alice", &["move", &id, "--to", "done"]);

    let value = board.json("alice", &["move", &id, "--to", "todo"]);
    assert!(value["data"]["task"]["completed_at"].is_null());
    Ok(())
}

#[test]
fn unknown_retention_values_are_config_errors() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();
    std::fs::write(
        board.path().join("config.toml"),
        "[board]\ncompletion_retention = \"sometimes\"\n",
    )?;

    board
        .cmd("alice")
        .arg("list")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Invalid configuration"));
    Ok(())
}

#[test]
fn init_writes_the_default_config() -> Result<(), Box<dyn std::error::Error>> {
    let board = TestBoard::new();

    board
        .cmd_without_user()
        .arg("init")
        .assert()
        .success()
        .stdout(contains("mkan init: initialized"));

    let config = std::fs::read_to_string(board.path().join("config.toml"))?;
    assert!(config.contains("completion_retention = \"retain\""));

    board
        .cmd_without_user()
        .arg("init")
        .assert()
        .success()
        .stdout(contains("mkan init: nothing to do"));
    Ok(())
}
