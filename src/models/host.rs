//! Host resource report data model

use serde::{Serialize, Serializer};

/// A container limit: a number when one is set, `"unlimited"` otherwise
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit<T> {
    Limited(T),
    Unlimited,
}

impl<T> From<Option<T>> for Limit<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Limit::Limited(v),
            None => Limit::Unlimited,
        }
    }
}

impl<T: Serialize> Serialize for Limit<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Limited(v) => v.serialize(serializer),
            Limit::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInfo {
    #[serde(rename = "logicalCores")]
    pub logical_cores: usize,
    /// CPUs available to the container (quota / period)
    #[serde(rename = "cpuLimit")]
    pub cpu_limit: Limit<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryInfo {
    #[serde(rename = "totalMemBytes")]
    pub total_mem_bytes: u64,
    #[serde(rename = "memoryLimit")]
    pub memory_limit: Limit<u64>,
}

/// Body of `/host-info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResources {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
}
