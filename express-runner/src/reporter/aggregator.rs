// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding unit results into a run summary.

use super::Reporter;
use crate::{
    runner::{Outcome, UnitResult},
    time::{StopwatchStart, stopwatch},
};
use chrono::{DateTime, Local};
use std::time::Duration;

/// Accumulates the results of a run as they come in.
#[derive(Debug)]
pub struct RunAggregator {
    total: usize,
    executed: usize,
    elapsed: Duration,
    worst: Outcome,
    report: String,
    stopwatch: StopwatchStart,
}

impl RunAggregator {
    /// Creates a new aggregator for a run over a registry of `total` units.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            executed: 0,
            elapsed: Duration::ZERO,
            worst: Outcome::Success,
            report: String::new(),
            stopwatch: stopwatch(),
        }
    }

    /// Records the result of a single unit, rendering its line with `reporter`.
    pub fn record(&mut self, result: &UnitResult, reporter: &dyn Reporter) {
        self.report.push_str(&reporter.unit_line(result));
        self.executed += 1;
        self.elapsed += result.elapsed();
        self.worst = self.worst.max(result.outcome());
    }

    /// Returns the number of units recorded so far.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Returns the worst outcome recorded so far.
    pub fn worst(&self) -> Outcome {
        self.worst
    }

    /// Finishes the run, producing its summary.
    pub fn finish(self, pattern: impl Into<String>) -> RunSummary {
        let snapshot = self.stopwatch.snapshot();
        RunSummary::new(
            self.executed,
            self.total,
            self.elapsed,
            self.worst,
            self.report,
            pattern.into(),
            snapshot.end_time(),
        )
    }
}

/// The summary of a completed run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    executed: usize,
    total: usize,
    elapsed: Duration,
    worst: Outcome,
    report: String,
    pattern: String,
    timestamp: DateTime<Local>,
}

impl RunSummary {
    /// Creates a new summary.
    pub fn new(
        executed: usize,
        total: usize,
        elapsed: Duration,
        worst: Outcome,
        report: String,
        pattern: String,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            executed,
            total,
            elapsed,
            worst,
            report,
            pattern,
            timestamp,
        }
    }

    /// Returns the number of units that were executed.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Returns the number of units that were registered when the run started.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the sum of the elapsed times of every executed unit.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the most severe outcome in the run, or `Success` if nothing ran.
    pub fn worst(&self) -> Outcome {
        self.worst
    }

    /// Returns the concatenated per-unit report lines.
    pub fn unit_report(&self) -> &str {
        &self.report
    }

    /// Returns the selection pattern used for the run, or an empty string if every unit was
    /// eligible.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the time at which the run finished.
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Renders the full report: every unit line, followed by the summary block.
    pub fn render(&self, reporter: &dyn Reporter) -> String {
        let mut out = self.report.clone();
        out.push_str(&reporter.summary(self));
        out
    }
}
