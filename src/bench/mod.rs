//! Benchmark engine module
//!
//! Contains the write benchmark runner, the run state it shares with the
//! status reporter, and the progress log both of them use.

pub mod log;
pub mod runner;
pub mod state;
pub mod status;

// Re-export commonly used types
pub use log::ProgressLog;
pub use runner::{WriteBenchmark, WriteTestParams};
pub use state::{ActiveRun, BenchmarkState, RunTracker};
pub use status::StatusReporter;
