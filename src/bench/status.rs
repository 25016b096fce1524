//! Write test status reporting

use crate::bench::log::{self, ProgressLog, CURRENT_PROGRESS_LABEL};
use crate::bench::state::RunTracker;
use crate::config::ServiceConfig;
use crate::{Result, NO_LOG_SENTINEL};

/// Serves the progress log plus a live line for an active run
#[derive(Debug, Clone)]
pub struct StatusReporter {
    log: ProgressLog,
    tracker: RunTracker,
}

impl StatusReporter {
    pub fn new(config: &ServiceConfig, tracker: RunTracker) -> Self {
        Self {
            log: ProgressLog::new(config.log_file.clone()),
            tracker,
        }
    }

    /// Current status text
    ///
    /// Returns [`NO_LOG_SENTINEL`] when no run has ever written a log.
    pub async fn status(&self) -> Result<String> {
        let Some(mut content) = self.log.read().await? else {
            return Ok(NO_LOG_SENTINEL.to_string());
        };

        if let Some(state) = self.tracker.snapshot().filter(|s| !s.completed()) {
            content.push_str(&log::progress_line(
                CURRENT_PROGRESS_LABEL,
                state.files_written,
                state.file_count,
                state.elapsed(),
            ));
            content.push('\n');
        }

        Ok(content)
    }
}
