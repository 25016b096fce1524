//! Write benchmark runner
//!
//! Creates `count` files of `size` KB each in the write directory,
//! advancing the shared run state after every file and appending progress
//! lines to the log at fixed checkpoints.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::{fs, task};
use crate::{StressError, Result};
use crate::bench::log::{self, ProgressLog, PROGRESS_LABEL};
use crate::bench::state::{ActiveRun, RunTracker};
use crate::config::ServiceConfig;
use crate::models::WriteTestSummary;
use crate::util::units::{calculate_throughput_mbps, format_throughput};

/// Validated write test parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTestParams {
    /// Number of files to create
    pub file_count: u64,
    /// Size of each file in KB
    pub file_size_kb: u64,
}

impl WriteTestParams {
    /// Check raw request values; both must be strictly positive
    pub fn new(count: i64, size_kb: i64) -> Result<Self> {
        if count <= 0 || size_kb <= 0 {
            return Err(StressError::InvalidArgument(
                "Count and size must be positive".to_string()
            ));
        }
        Ok(Self {
            file_count: count as u64,
            file_size_kb: size_kb as u64,
        })
    }

    /// Bytes in each file
    pub fn file_size_bytes(&self) -> usize {
        (self.file_size_kb as usize) * 1024
    }
}

/// Write benchmark executor
#[derive(Debug, Clone)]
pub struct WriteBenchmark {
    write_dir: PathBuf,
    log: ProgressLog,
    tracker: RunTracker,
    progress_interval: u64,
    max_file_count: u64,
    max_file_size_kb: u64,
}

impl WriteBenchmark {
    /// Create a runner sharing `tracker` with the status reporter
    pub fn new(config: &ServiceConfig, tracker: RunTracker) -> Self {
        Self {
            write_dir: config.write_dir.clone(),
            log: ProgressLog::new(config.log_file.clone()),
            tracker,
            progress_interval: config.progress_interval.max(1),
            max_file_count: config.max_file_count,
            max_file_size_kb: config.max_file_size_kb,
        }
    }

    pub fn write_dir(&self) -> &Path {
        &self.write_dir
    }

    pub fn tracker(&self) -> &RunTracker {
        &self.tracker
    }

    /// Run the benchmark on its own task and wait for it
    ///
    /// The spawned task owns the run, so it finishes (or fails and discards
    /// its state) even if the caller goes away.
    pub async fn spawn_run(&self, params: WriteTestParams) -> Result<WriteTestSummary> {
        let benchmark = self.clone();
        task::spawn(async move { benchmark.run(params).await }).await?
    }

    /// Execute the write benchmark
    pub async fn run(&self, params: WriteTestParams) -> Result<WriteTestSummary> {
        self.check_limits(&params)?;

        let run = self.tracker.begin(params.file_count)?;
        tracing::info!(
            run_id = run.run_id(),
            started_at = %run.started_at_utc().to_rfc3339(),
            files = params.file_count,
            size_kb = params.file_size_kb,
            "Write test accepted"
        );

        match self.execute(&run, params).await {
            Ok(summary) => {
                run.finish();
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(run_id = run.run_id(), error = %e, "Write test failed");
                run.fail();
                Err(e)
            }
        }
    }

    fn check_limits(&self, params: &WriteTestParams) -> Result<()> {
        if params.file_count > self.max_file_count {
            return Err(StressError::InvalidArgument(format!(
                "Count {} exceeds the maximum of {}",
                params.file_count, self.max_file_count
            )));
        }
        if params.file_size_kb > self.max_file_size_kb {
            return Err(StressError::InvalidArgument(format!(
                "Size {}KB exceeds the maximum of {}KB",
                params.file_size_kb, self.max_file_size_kb
            )));
        }
        Ok(())
    }

    async fn execute(&self, run: &ActiveRun, params: WriteTestParams) -> Result<WriteTestSummary> {
        let WriteTestParams { file_count, file_size_kb } = params;

        fs::create_dir_all(&self.write_dir).await.map_err(|e| {
            StressError::Benchmark(format!(
                "Failed to create directory {}: {}",
                self.write_dir.display(),
                e
            ))
        })?;

        let start_msg = log::start_line(file_count, file_size_kb);
        self.log.reset(&start_msg).await.map_err(|e| {
            StressError::Benchmark(format!("Failed to create log file: {}", e))
        })?;
        tracing::info!("{}", start_msg);

        let data = create_test_buffer(params.file_size_bytes());
        let loop_start = Instant::now();

        for i in 0..file_count {
            let path = self.write_dir.join(format!("file_{}.txt", i));
            write_file(path, Arc::clone(&data)).await.map_err(|e| {
                StressError::Benchmark(format!("Failed to write file {}: {}", i, e))
            })?;

            let files_written = i + 1;
            run.record_progress(files_written);

            if files_written % self.progress_interval == 0 || files_written == file_count {
                let line = log::progress_line(
                    PROGRESS_LABEL,
                    files_written,
                    file_count,
                    run.started_at().elapsed(),
                );
                self.log.append(&line).await.map_err(|e| {
                    StressError::Benchmark(format!("Failed to write progress: {}", e))
                })?;
                tracing::info!("{}", line);
                task::yield_now().await;
            }
        }

        let duration = loop_start.elapsed();
        let completion_msg = log::completion_line(file_count, duration);
        self.log.append(&completion_msg).await.map_err(|e| {
            StressError::Benchmark(format!("Failed to write completion: {}", e))
        })?;

        let summary = WriteTestSummary::new(file_count, file_size_kb, duration);
        tracing::info!(
            duration = %humantime::format_duration(duration),
            throughput = %format_throughput(calculate_throughput_mbps(summary.total_bytes(), duration)),
            "{}",
            completion_msg
        );

        Ok(summary)
    }
}

/// Fixed-content buffer shared by every file of a run
fn create_test_buffer(size: usize) -> Arc<[u8]> {
    Arc::from(vec![b'a'; size])
}

async fn write_file(path: PathBuf, data: Arc<[u8]>) -> io::Result<()> {
    match task::spawn_blocking(move || std::fs::write(&path, &data[..])).await {
        Ok(result) => result,
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
    }
}
