//! Configuration management module
//!
//! Handles loading and validation of the service configuration: listen
//! address, benchmark locations, and request limits.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::{
    StressError, Result, APP_NAME, CONFIG_FILE, DEFAULT_CGROUP_ROOT, DEFAULT_LOG_FILE,
    DEFAULT_PORT, DEFAULT_WRITE_DIR,
};

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "STRESSCRAFT_CONFIG";

/// Service configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Interface to bind the HTTP listener on
    pub host: String,
    /// TCP port for the HTTP listener
    pub port: u16,
    /// Directory the write benchmark creates its files in
    pub write_dir: PathBuf,
    /// Plain-text progress log, overwritten at the start of each run
    pub log_file: PathBuf,
    /// Mount point of the cgroup filesystem
    pub cgroup_root: PathBuf,
    /// Number of files between periodic progress lines
    pub progress_interval: u64,
    /// Largest accepted `count` for a write test
    pub max_file_count: u64,
    /// Largest accepted `size` (KB) for a write test
    pub max_file_size_kb: u64,
    /// `count` used when the request omits it
    pub default_count: i64,
    /// `size` used when the request omits it
    pub default_size_kb: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            write_dir: PathBuf::from(DEFAULT_WRITE_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            progress_interval: 1000,
            max_file_count: 100_000,
            max_file_size_kb: 1_024_000,
            default_count: 100,
            default_size_kb: 100,
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(StressError::Config("Host must not be empty".to_string()));
        }

        if self.port == 0 {
            return Err(StressError::Config("Port must be greater than 0".to_string()));
        }

        if self.progress_interval == 0 {
            return Err(StressError::Config(
                "Progress interval must be greater than 0".to_string()
            ));
        }

        if self.max_file_count == 0 || self.max_file_size_kb == 0 {
            return Err(StressError::Config(
                "File count and size limits must be greater than 0".to_string()
            ));
        }

        if self.default_count <= 0 || self.default_count as u64 > self.max_file_count {
            return Err(StressError::Config(
                format!("Default count must be between 1 and {}", self.max_file_count)
            ));
        }

        if self.default_size_kb <= 0 || self.default_size_kb as u64 > self.max_file_size_kb {
            return Err(StressError::Config(
                format!("Default size must be between 1 and {} KB", self.max_file_size_kb)
            ));
        }

        if self.log_file.starts_with(&self.write_dir) {
            return Err(StressError::Config(format!(
                "Log file {} must live outside the write directory {}",
                self.log_file.display(),
                self.write_dir.display()
            )));
        }

        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Set the listener port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the benchmark write directory
    pub fn with_write_dir(mut self, path: PathBuf) -> Self {
        self.write_dir = path;
        self
    }

    /// Set the progress log path
    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = path;
        self
    }

    /// Set the cgroup mount point
    pub fn with_cgroup_root(mut self, path: PathBuf) -> Self {
        self.cgroup_root = path;
        self
    }

    /// Set the number of files between progress lines
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the request limits
    pub fn with_limits(mut self, max_file_count: u64, max_file_size_kb: u64) -> Self {
        self.max_file_count = max_file_count;
        self.max_file_size_kb = max_file_size_kb;
        self
    }

    /// Load configuration the way the service binary does: defaults, then
    /// the config file if one exists, then environment overrides
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match Self::config_file_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        let config = config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StressError::Config(
                format!("Failed to read config file {}: {}", path.display(), e)
            ))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| StressError::Config(
                format!("Failed to parse config file {}: {}", path.display(), e)
            ))?;

        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("RUST_BACKEND_PORT") {
            self.port = parse_env("RUST_BACKEND_PORT", &port)?;
        }
        if let Some(dir) = lookup("STRESSCRAFT_WRITE_DIR") {
            self.write_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("STRESSCRAFT_LOG_FILE") {
            self.log_file = PathBuf::from(file);
        }
        if let Some(root) = lookup("STRESSCRAFT_CGROUP_ROOT") {
            self.cgroup_root = PathBuf::from(root);
        }
        if let Some(interval) = lookup("STRESSCRAFT_PROGRESS_INTERVAL") {
            self.progress_interval = parse_env("STRESSCRAFT_PROGRESS_INTERVAL", &interval)?;
        }
        Ok(self)
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/stresscraft/stresscraft.toml
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        StressError::Config(format!("Invalid value {:?} for {}: {}", value, key, e))
    })
}
