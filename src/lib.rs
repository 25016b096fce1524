//! stresscraft - container resource probe and write benchmark service
//!
//! Reports the CPU and memory limits the process runs under and drives a
//! filesystem write-throughput benchmark whose progress can be polled over
//! HTTP while it runs.

pub mod bench;
pub mod config;
pub mod host;
pub mod models;
pub mod server;
pub mod util;

// Common error types
#[derive(Debug, thiserror::Error)]
pub enum StressError {
    /// Request parameters rejected before any I/O
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A benchmark run is already in progress
    #[error("Conflict: {0}")]
    Conflict(String),
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Benchmark execution error
    #[error("Benchmark error: {0}")]
    Benchmark(String),
    /// Configuration validation or parsing error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StressError {
    /// Whether the error was caused by the caller rather than the host
    pub fn is_client_error(&self) -> bool {
        matches!(self, StressError::InvalidArgument(_) | StressError::Conflict(_))
    }
}

impl From<toml::de::Error> for StressError {
    fn from(err: toml::de::Error) -> Self {
        StressError::Config(format!("TOML parsing error: {}", err))
    }
}

impl From<tokio::task::JoinError> for StressError {
    fn from(err: tokio::task::JoinError) -> Self {
        StressError::Benchmark(format!("Benchmark task failed: {}", err))
    }
}

/// Result type alias for stresscraft operations
pub type Result<T> = std::result::Result<T, StressError>;

// Common types and constants
pub const APP_NAME: &str = "stresscraft";
pub const CONFIG_FILE: &str = "stresscraft.toml";
pub const DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_WRITE_DIR: &str = "/tmp/test-write";
pub const DEFAULT_LOG_FILE: &str = "/tmp/stress-status-rust.log";
pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";
pub const NO_LOG_SENTINEL: &str = "No log found";
