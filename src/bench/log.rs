//! Progress log file
//!
//! The plain-text log is the only durable artifact of a run. It is
//! truncated when a run starts and every later line is appended and synced
//! before the writer moves on, so pollers see it immediately.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use crate::Result;

/// Prefix of the periodic lines written by the runner
pub const PROGRESS_LABEL: &str = "Progress";
/// Prefix of the live line appended by the status reporter
pub const CURRENT_PROGRESS_LABEL: &str = "Current Progress";

/// `Write test started - 100 files of 100KB each`
pub fn start_line(file_count: u64, file_size_kb: u64) -> String {
    format!("Write test started - {} files of {}KB each", file_count, file_size_kb)
}

/// `Progress: 1000 / 2500 (40.0%) - Elapsed: 0.42s`
pub fn progress_line(label: &str, files_written: u64, file_count: u64, elapsed: Duration) -> String {
    let percentage = if file_count == 0 {
        0.0
    } else {
        (files_written as f64) / (file_count as f64) * 100.0
    };
    format!(
        "{}: {} / {} ({:.1}%) - Elapsed: {:.2}s",
        label,
        files_written,
        file_count,
        percentage,
        elapsed.as_secs_f64()
    )
}

/// `Completed: 2500 / 2500 (100.0%) - Total time: 1.05s`
pub fn completion_line(file_count: u64, total: Duration) -> String {
    format!(
        "Completed: {} / {} (100.0%) - Total time: {:.2}s",
        file_count,
        file_count,
        total.as_secs_f64()
    )
}

/// Handle on the progress log file
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Truncate the log and write its first line
    pub async fn reset(&self, first_line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&self.path).await?;
        file.write_all(first_line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    /// Append one line and sync it to disk
    pub async fn append(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path).await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    /// Whole log content, or `None` when no log has been written yet
    pub async fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
