use engine_logging::engine_warn;

use crate::ProgressUpdate;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_STARTING: &str = "Starting...";
pub const STATUS_DONE: &str = "Done!";
pub const STATUS_MALFORMED: &str = "Error: malformed message from server";

/// Progress indicator plus the status line beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    /// 0..=100
    pub percent: f64,
    pub status: String,
}

impl Default for ProgressView {
    fn default() -> Self {
        Self {
            percent: 0.0,
            status: STATUS_READY.to_string(),
        }
    }
}

impl ProgressView {
    pub fn reset(&mut self) {
        self.percent = 0.0;
        self.status = STATUS_STARTING.to_string();
    }

    pub fn apply_progress(&mut self, update: &ProgressUpdate) {
        self.percent = percent_of(update.current, update.total);
        self.status = format!(
            "Processing {} of {}: {}",
            update.current, update.total, update.item
        );
    }

    /// Server-reported error. The indicator keeps its last value.
    pub fn apply_error(&mut self, message: &str) {
        engine_warn!("Server reported error: {}", message);
        self.status = format!("Error: {message}");
    }

    pub fn complete(&mut self) {
        self.percent = 100.0;
        self.status = STATUS_DONE.to_string();
    }

    pub fn malformed(&mut self) {
        self.status = STATUS_MALFORMED.to_string();
    }

    pub fn connection_failed(&mut self, detail: &str) {
        self.status = format!("Connection error: {detail}");
    }
}

/// `current / total` as a percentage clamped to `0..=100`. A zero total reads as 0%.
pub fn percent_of(current: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (current as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}
