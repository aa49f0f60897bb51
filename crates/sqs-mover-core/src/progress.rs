//! Progress accounting for a move.
//!
//! [`ProgressState`] is the counter owned by the orchestrator. A
//! [`ProgressReporter`] is told about every committed cycle and renders it
//! however it likes; the terminal progress bar lives in the binary.

use crate::mover::{MoveOutcome, MoveReport};
use tracing::{info, warn};

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;

/// Messages moved so far against the fixed target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    moved: u64,
    target: u64,
}

impl ProgressState {
    pub fn new(target: u64) -> Self {
        Self { moved: 0, target }
    }

    pub fn moved(&self) -> u64 {
        self.moved
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Count `count` more messages as moved
    pub fn record(&mut self, count: u64) {
        self.moved = self.moved.saturating_add(count);
    }

    pub fn remaining(&self) -> u64 {
        self.target.saturating_sub(self.moved)
    }

    pub fn is_complete(&self) -> bool {
        self.moved >= self.target
    }

    /// Completed share in `[0.0, 1.0]`; an empty target counts as complete
    pub fn fraction(&self) -> f64 {
        if self.target == 0 {
            return 1.0;
        }
        (self.moved as f64 / self.target as f64).min(1.0)
    }
}

/// Observer of a running move
///
/// `start` is called once the target is known and at least one cycle will
/// run. `update` follows every committed cycle. Exactly one of `finish` or
/// `abandon` ends the run.
pub trait ProgressReporter: Send {
    fn start(&mut self, target: u64);

    fn update(&mut self, moved: u64, target: u64);

    fn finish(&mut self, report: &MoveReport);

    fn abandon(&mut self, moved: u64, target: u64);
}

/// Reporter that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn start(&mut self, _target: u64) {}

    fn update(&mut self, _moved: u64, _target: u64) {}

    fn finish(&mut self, _report: &MoveReport) {}

    fn abandon(&mut self, _moved: u64, _target: u64) {}
}

/// Reporter that emits a `tracing` event per cycle
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn start(&mut self, target: u64) {
        info!(target, "Starting to move messages");
    }

    fn update(&mut self, moved: u64, target: u64) {
        let percent = (ProgressState { moved, target }.fraction() * 100.0).round() as u64;
        info!(moved, target, percent, "Moved batch");
    }

    fn finish(&mut self, report: &MoveReport) {
        match report.outcome {
            MoveOutcome::Completed => info!(
                moved = report.moved,
                target = report.target,
                cycles = report.cycles,
                "Move completed"
            ),
            MoveOutcome::Exhausted => info!(
                moved = report.moved,
                target = report.target,
                "Source ran out of messages before the target was reached"
            ),
            MoveOutcome::Cancelled => warn!(
                moved = report.moved,
                target = report.target,
                "Move cancelled"
            ),
        }
    }

    fn abandon(&mut self, moved: u64, target: u64) {
        warn!(moved, target, "Move abandoned");
    }
}
