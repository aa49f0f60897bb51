//! Terminal progress bar for a running move.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use sqs_mover_core::{MoveOutcome, MoveReport, ProgressReporter};

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;

const BAR_TEMPLATE: &str = "|{bar:40.cyan}| {percent}% ({pos}/{len})";

/// Reporter drawing an `indicatif` bar on stderr
///
/// The bar is sized to the backlog estimate when the run starts and advances
/// after each committed cycle. Nothing is drawn until `start`, so runs that
/// end before draining (empty source, resolution failures) leave no bar behind.
pub struct ProgressBarReporter {
    bar: ProgressBar,
    visible: bool,
    started: bool,
}

impl ProgressBarReporter {
    pub fn new() -> Self {
        Self::with_visibility(true)
    }

    /// Reporter that keeps its state without drawing anything
    pub fn hidden() -> Self {
        Self::with_visibility(false)
    }

    fn with_visibility(visible: bool) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        bar.set_style(bar_style());
        Self {
            bar,
            visible,
            started: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True while nothing can reach the terminal
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Default for ProgressBarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn start(&mut self, target: u64) {
        self.started = true;
        self.bar.set_length(target);
        self.bar.set_position(0);
        if self.visible {
            self.bar.set_draw_target(ProgressDrawTarget::stderr());
        }
    }

    fn update(&mut self, moved: u64, target: u64) {
        self.bar.set_length(target);
        self.bar.set_position(moved.min(target));
    }

    fn finish(&mut self, report: &MoveReport) {
        self.bar.set_length(report.target);
        self.bar.set_position(report.moved.min(report.target));
        match report.outcome {
            MoveOutcome::Completed => self.bar.finish(),
            MoveOutcome::Exhausted | MoveOutcome::Cancelled => self.bar.abandon(),
        }
    }

    fn abandon(&mut self, moved: u64, target: u64) {
        self.bar.set_position(moved.min(target));
        self.bar.abandon();
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("█░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
