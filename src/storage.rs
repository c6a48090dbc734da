//! Storage layer for mkan.
//!
//! All persistent state lives in one data directory:
//!
//! ```text
//! <data-dir>/
//!   config.toml           # User configuration
//!   user                  # Persisted default user id
//!   tasks-<user>.json     # One task array per user
//!   tasks-<user>.json.lock
//! ```
//!
//! Task files are written atomically (temp file + rename) and every
//! read-modify-write cycle holds an advisory lock, so two concurrent CLI
//! invocations cannot interleave partial writes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};

use crate::backend::{merge_batch, StoredTask, TaskBackend};
use crate::error::{Error, Result};
use crate::task::Task;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const USER_FILENAME: &str = "user";

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Retry interval when waiting for a lock
const LOCK_RETRY_INTERVAL_MS: u64 = 50;

/// Handle on the mkan data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory: an explicit path wins, otherwise the
    /// platform data dir for mkan.
    pub fn resolve(explicit: Option<&Path>) -> Result<DataDir> {
        if let Some(path) = explicit {
            return Ok(DataDir {
                root: path.to_path_buf(),
            });
        }
        let dirs = directories::ProjectDirs::from("", "", "mkan").ok_or_else(|| {
            Error::OperationFailed(
                "cannot determine a data directory; pass --data-dir".to_string(),
            )
        })?;
        Ok(DataDir {
            root: dirs.data_dir().to_path_buf(),
        })
    }

    pub fn at(root: PathBuf) -> DataDir {
        DataDir { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    pub fn user_file(&self) -> PathBuf {
        self.root.join(USER_FILENAME)
    }

    /// Path of a user's task file. User ids are reduced to their
    /// alphanumeric characters for the file name.
    pub fn tasks_file(&self, user_id: &str) -> Result<PathBuf> {
        let stem = user_file_stem(user_id)?;
        Ok(self.root.join(format!("tasks-{stem}.json")))
    }

    pub fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file().exists()
    }

    /// Write JSON data atomically (write to temp, then rename).
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file.
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }
}

/// Reduce a user id to the alphanumeric characters used in file names.
fn user_file_stem(user_id: &str) -> Result<String> {
    let stem: String = user_id
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect();
    if stem.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "user id {:?} has no usable characters",
            user_id
        )));
    }
    Ok(stem.to_ascii_lowercase())
}

/// Write data atomically using temp file + rename, so readers never see a
/// partial file.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file); // Windows cannot rename a file that is still open
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // On Windows, fs2 can surface lock/sharing violations as "Other".
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// A file lock guard that releases the lock when dropped.
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock with a timeout, creating the lock file if
    /// needed.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        let retry_interval = Duration::from_millis(LOCK_RETRY_INTERVAL_MS);

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(FileLock {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_lock_contended(&e) => {
                    if start.elapsed() >= timeout {
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    std::thread::sleep(retry_interval);
                }
                Err(e) => {
                    return Err(Error::Io(e));
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// File-backed task store: one JSON array of rows per user.
#[derive(Debug, Clone)]
pub struct FileBackend {
    data_dir: DataDir,
    lock_timeout_ms: u64,
}

impl FileBackend {
    pub fn new(data_dir: DataDir, lock_timeout_ms: u64) -> FileBackend {
        FileBackend {
            data_dir,
            lock_timeout_ms,
        }
    }

    fn read_rows(&self, user_id: &str) -> Result<Vec<StoredTask>> {
        let path = self.data_dir.tasks_file(user_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        self.data_dir.read_json(&path)
    }

    fn write_rows(&self, user_id: &str, rows: &[StoredTask]) -> Result<()> {
        let path = self.data_dir.tasks_file(user_id)?;
        tracing::debug!(user = user_id, rows = rows.len(), "writing task file");
        self.data_dir.write_json(&path, &rows)
    }

    fn lock_for(&self, user_id: &str) -> Result<FileLock> {
        let path = self.data_dir.tasks_file(user_id)?;
        let lock_path = PathBuf::from(format!("{}.lock", path.display()));
        FileLock::acquire(lock_path, self.lock_timeout_ms)
    }

    fn collect(&self, user_id: &str, archived: bool) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        for row in self.read_rows(user_id)? {
            if row.is_archived == archived {
                tasks.push(row.into_task()?);
            }
        }
        Ok(tasks)
    }
}

impl TaskBackend for FileBackend {
    fn list(&self, user_id: &str) -> Result<Vec<Task>> {
        self.collect(user_id, false)
    }

    fn save(&self, user_id: &str, task: &Task) -> Result<Task> {
        let _lock = self.lock_for(user_id)?;
        let mut rows = self.read_rows(user_id)?;
        let row = StoredTask::from_task(task);
        match rows.iter().position(|entry| entry.id == task.id) {
            Some(index) => rows[index] = row,
            None => rows.push(row),
        }
        self.write_rows(user_id, &rows)?;
        Ok(task.clone())
    }

    fn delete(&self, user_id: &str, task_id: &str) -> Result<()> {
        let _lock = self.lock_for(user_id)?;
        let mut rows = self.read_rows(user_id)?;
        if rows.is_empty() {
            return Ok(());
        }
        rows.retain(|entry| entry.id != task_id);
        self.write_rows(user_id, &rows)
    }

    fn archive(&self, user_id: &str, task_id: &str) -> Result<()> {
        let _lock = self.lock_for(user_id)?;
        let mut rows = self.read_rows(user_id)?;
        let row = rows
            .iter_mut()
            .find(|entry| entry.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        row.is_archived = true;
        self.write_rows(user_id, &rows)
    }

    fn list_archived(&self, user_id: &str) -> Result<Vec<Task>> {
        self.collect(user_id, true)
    }

    fn batch_update(&self, user_id: &str, tasks: &[Task]) -> Result<()> {
        let _lock = self.lock_for(user_id)?;
        let rows = self.read_rows(user_id)?;
        let merged = merge_batch(&rows, tasks);
        self.write_rows(user_id, &merged)
    }
}
