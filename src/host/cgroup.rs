//! Best-effort cgroup limit detection
//!
//! Reads CPU and memory ceilings from the cgroup filesystem. The v1
//! controller files are tried first, then the v2 unified files. Anything
//! missing or unparsable means "no limit": detection never fails.

use std::fs;
use std::path::PathBuf;

const V1_CPU_QUOTA: &str = "cpu/cpu.cfs_quota_us";
const V1_CPU_PERIOD: &str = "cpu/cpu.cfs_period_us";
const V1_MEMORY_LIMIT: &str = "memory/memory.limit_in_bytes";
const V2_CPU_MAX: &str = "cpu.max";
const V2_MEMORY_MAX: &str = "memory.max";
const V2_MAX_INDICATOR: &str = "max";

/// Reader rooted at a cgroup mount point
#[derive(Debug, Clone)]
pub struct CgroupReader {
    root: PathBuf,
}

impl CgroupReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// CPUs the container may use (quota / period), if limited
    pub fn cpu_limit(&self) -> Option<f64> {
        self.cpu_limit_v1().or_else(|| self.cpu_limit_v2())
    }

    /// Memory ceiling in bytes, if one is set below `total_memory`
    pub fn memory_limit(&self, total_memory: u64) -> Option<u64> {
        self.read_trimmed(V1_MEMORY_LIMIT)
            .or_else(|| self.read_trimmed(V2_MEMORY_MAX))
            .filter(|value| value != V2_MAX_INDICATOR)
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|&limit| limit > 0 && limit < total_memory)
    }

    fn cpu_limit_v1(&self) -> Option<f64> {
        let quota = self.read_trimmed(V1_CPU_QUOTA)?.parse::<f64>().ok()?;
        let period = self.read_trimmed(V1_CPU_PERIOD)?.parse::<f64>().ok()?;
        quota_ratio(quota, period)
    }

    // cpu.max holds "<quota> <period>", quota may be "max"
    fn cpu_limit_v2(&self) -> Option<f64> {
        let content = self.read_trimmed(V2_CPU_MAX)?;
        let mut fields = content.split_whitespace();
        let quota = fields.next()?;
        if quota == V2_MAX_INDICATOR {
            return None;
        }
        let quota = quota.parse::<f64>().ok()?;
        let period = fields.next()?.parse::<f64>().ok()?;
        quota_ratio(quota, period)
    }

    fn read_trimmed(&self, relative: &str) -> Option<String> {
        let path = self.root.join(relative);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "cgroup file unavailable");
                None
            }
        }
    }
}

fn quota_ratio(quota: f64, period: f64) -> Option<f64> {
    if quota > 0.0 && period > 0.0 {
        Some(quota / period)
    } else {
        None
    }
}
