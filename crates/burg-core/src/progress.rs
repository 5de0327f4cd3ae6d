//! Progress reporting for long generation runs

use tracing::debug;

/// Receives stage and unit notifications from the generators.
///
/// Implementations must not block; generation is synchronous.
pub trait Progress {
    /// A new stage begins with `total` units of work
    fn set_stage(&mut self, label: &str, total: usize);

    /// `delta` more units of the current stage are done
    fn complete(&mut self, delta: usize);
}

/// Discards all notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn set_stage(&mut self, _label: &str, _total: usize) {}

    fn complete(&mut self, _delta: usize) {}
}

/// Tracks the current stage and reports it through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    stage: String,
    total: usize,
    done: usize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Units done and total units of the current stage
    pub fn position(&self) -> (usize, usize) {
        (self.done, self.total)
    }
}

impl Progress for LogProgress {
    fn set_stage(&mut self, label: &str, total: usize) {
        self.stage = label.to_string();
        self.total = total;
        self.done = 0;
        debug!(stage = label, total, "generation stage");
    }

    fn complete(&mut self, delta: usize) {
        self.done += delta;
        if self.done == self.total {
            debug!(stage = %self.stage, "stage complete");
        }
    }
}
