//! Run state tracking
//!
//! Holds the single benchmark state slot shared between the runner, which
//! advances it, and the status reporter, which snapshots it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use crate::{StressError, Result};

/// Progress of one write benchmark run
#[derive(Debug, Clone)]
pub struct BenchmarkState {
    /// Generation number of the run owning this state
    pub run_id: u64,
    /// Total files requested
    pub file_count: u64,
    /// Files completed so far
    pub files_written: u64,
    /// Monotonic start time, used for elapsed-time arithmetic
    pub started_at: Instant,
    /// Wall-clock start time
    pub started_at_utc: DateTime<Utc>,
    /// Set once the runner has written its completion line
    pub finished: bool,
}

impl BenchmarkState {
    fn new(run_id: u64, file_count: u64) -> Self {
        Self {
            run_id,
            file_count,
            files_written: 0,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
            finished: false,
        }
    }

    /// True once every requested file has been written
    ///
    /// The runner may still be appending its final log lines; see
    /// [`BenchmarkState::finished`].
    pub fn completed(&self) -> bool {
        self.files_written >= self.file_count
    }

    /// Completion percentage (0.0 to 100.0)
    pub fn percentage(&self) -> f64 {
        if self.file_count == 0 {
            0.0
        } else {
            (self.files_written as f64) / (self.file_count as f64) * 100.0
        }
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<BenchmarkState>,
    next_run_id: u64,
}

/// Owner of the benchmark state slot
///
/// Cloning is cheap and every clone observes the same slot. All reads and
/// writes go through one mutex, which is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct RunTracker {
    slot: Arc<Mutex<Slot>>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // Every update is a single assignment, so a poisoned slot is still coherent.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking a new run, replacing any finished state
    ///
    /// Fails with [`StressError::Conflict`] until the previous run has called
    /// [`ActiveRun::finish`], even once all of its files are written.
    pub fn begin(&self, file_count: u64) -> Result<ActiveRun> {
        if file_count == 0 {
            return Err(StressError::InvalidArgument(
                "File count must be greater than 0".to_string()
            ));
        }

        let mut slot = self.lock();
        if let Some(state) = slot.current.as_ref() {
            if !state.finished {
                return Err(StressError::Conflict(format!(
                    "A write test is already running ({} / {} files written)",
                    state.files_written, state.file_count
                )));
            }
        }

        slot.next_run_id += 1;
        let state = BenchmarkState::new(slot.next_run_id, file_count);
        let handle = ActiveRun {
            tracker: self.clone(),
            run_id: state.run_id,
            started_at: state.started_at,
            started_at_utc: state.started_at_utc,
            finished: false,
        };
        slot.current = Some(state);
        Ok(handle)
    }

    /// Copy of the current state, if a run has been started and not discarded
    pub fn snapshot(&self) -> Option<BenchmarkState> {
        self.lock().current.clone()
    }

    /// True while a run is in progress
    pub fn is_running(&self) -> bool {
        self.lock()
            .current
            .as_ref()
            .map(|state| !state.finished)
            .unwrap_or(false)
    }

    fn update(&self, run_id: u64, files_written: u64) {
        let mut slot = self.lock();
        if let Some(state) = slot.current.as_mut().filter(|s| s.run_id == run_id) {
            // never decreases, never passes file_count
            state.files_written = files_written.min(state.file_count).max(state.files_written);
        }
    }

    fn mark_finished(&self, run_id: u64) {
        let mut slot = self.lock();
        if let Some(state) = slot.current.as_mut().filter(|s| s.run_id == run_id) {
            state.finished = true;
        }
    }

    fn discard(&self, run_id: u64) {
        let mut slot = self.lock();
        if slot.current.as_ref().map(|s| s.run_id) == Some(run_id) {
            slot.current = None;
        }
    }
}

/// Write access to the state of the run that created it
///
/// Dropping an unfinished handle discards the run's state, so a failed or
/// panicked run never leaves a stale "running" entry behind.
#[derive(Debug)]
pub struct ActiveRun {
    tracker: RunTracker,
    run_id: u64,
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
    finished: bool,
}

impl ActiveRun {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Monotonic start time of the run
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn started_at_utc(&self) -> DateTime<Utc> {
        self.started_at_utc
    }

    /// Record that `files_written` files are complete
    pub fn record_progress(&self, files_written: u64) {
        self.tracker.update(self.run_id, files_written);
    }

    /// Mark the run finished; its completed state stays visible
    pub fn finish(mut self) {
        self.tracker.mark_finished(self.run_id);
        self.finished = true;
    }

    /// Discard the run's state
    pub fn fail(self) {
        // Drop does the work
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        if !self.finished {
            self.tracker.discard(self.run_id);
        }
    }
}
