//! Data models module
//!
//! Response bodies served by the HTTP surface: the write test summary and
//! the host resource report.

pub mod host;
pub mod result;

// Re-export commonly used types
pub use host::{CpuInfo, HostResources, Limit, MemoryInfo};
pub use result::WriteTestSummary;
