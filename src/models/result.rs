//! Write test result data model

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Summary returned by a completed write test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteTestSummary {
    /// Number of files written
    #[serde(rename = "filesWritten")]
    pub files_written: u64,
    /// Size of each file in KB
    #[serde(rename = "fileSizeKB")]
    pub file_size_kb: u64,
    /// Total data written in MB (`files * KB / 1024`)
    #[serde(rename = "totalSizeMB")]
    pub total_size_mb: f64,
    /// Wall time of the write loop in milliseconds
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

impl WriteTestSummary {
    pub fn new(files_written: u64, file_size_kb: u64, elapsed: Duration) -> Self {
        Self {
            files_written,
            file_size_kb,
            total_size_mb: (files_written as f64) * (file_size_kb as f64) / 1024.0,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    /// Total bytes written
    pub fn total_bytes(&self) -> u64 {
        self.files_written * self.file_size_kb * 1024
    }
}
