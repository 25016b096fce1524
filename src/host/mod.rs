//! Host resource detection
//!
//! Reports logical cores and physical memory together with any container
//! limits found in the cgroup filesystem.

pub mod cgroup;

use std::path::PathBuf;
use std::thread;
use sysinfo::System;
use crate::models::{CpuInfo, HostResources, Limit, MemoryInfo};

pub use cgroup::CgroupReader;

/// Probe for the resources visible to this process
#[derive(Debug, Clone)]
pub struct HostProbe {
    cgroup: CgroupReader,
}

impl HostProbe {
    pub fn new(cgroup_root: impl Into<PathBuf>) -> Self {
        Self {
            cgroup: CgroupReader::new(cgroup_root),
        }
    }

    /// Detect the current host resources
    pub fn detect(&self) -> HostResources {
        self.detect_with(logical_cores(), total_memory_bytes())
    }

    /// Build a report from already known host totals
    pub fn detect_with(&self, logical_cores: usize, total_mem_bytes: u64) -> HostResources {
        HostResources {
            cpu: CpuInfo {
                logical_cores,
                cpu_limit: Limit::from(self.cgroup.cpu_limit()),
            },
            memory: MemoryInfo {
                total_mem_bytes,
                memory_limit: Limit::from(self.cgroup.memory_limit(total_mem_bytes)),
            },
        }
    }
}

/// Logical CPUs available to the process
pub fn logical_cores() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Total physical memory in bytes
pub fn total_memory_bytes() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.total_memory()
}
