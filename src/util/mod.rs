//! Utility functions module
//!
//! Formatting helpers for sizes and throughput used in log output.

pub mod units;

// Re-export commonly used functions
pub use units::{calculate_throughput_mbps, format_bytes, format_throughput};
