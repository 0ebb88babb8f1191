// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of per-unit lines and run summaries.

use super::RunSummary;
use crate::{
    errors::InvalidTimestampFormat,
    runner::{Outcome, UnitResult},
};
use owo_colors::{OwoColorize, Style};
use swrite::{SWrite, swrite};

/// The default format for the timestamp in a run summary.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%x %H:%M:%S";

/// Renders unit results and run summaries as text.
///
/// Implement this to customize how a run is reported. [`TextReporter`] is the default.
pub trait Reporter {
    /// Renders the report line for a single unit, including its trailing newline.
    fn unit_line(&self, result: &UnitResult) -> String;

    /// Renders the summary block printed after every unit line.
    fn summary(&self, summary: &RunSummary) -> String;
}

/// The default, human-readable reporter.
///
/// Each unit is reported as
///
/// ```text
/// \t<OUTCOME> : <name>[::<stage>] - <message>
/// ```
///
/// followed by a summary of the form
///
/// ```text
/// Executed: <n>/<total> unit(s), <seconds>s at <timestamp>
/// Resulted: <OUTCOME>
/// Matching: <pattern>
/// ```
///
/// where the `Matching` line is only present if a selection pattern was used.
#[derive(Clone, Debug)]
pub struct TextReporter {
    styles: Styles,
    timestamp_format: String,
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextReporter {
    /// Creates a new reporter with no colors and the default timestamp format.
    pub fn new() -> Self {
        Self {
            styles: Styles::default(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
        }
    }

    /// Colorizes outcome labels with ANSI escapes.
    pub fn colorize(mut self) -> Self {
        self.styles.colorize();
        self
    }

    /// Sets the strftime-style format for the summary timestamp.
    ///
    /// Returns an error if `format` contains a specifier that chrono can't render.
    pub fn with_timestamp_format(
        mut self,
        format: impl Into<String>,
    ) -> Result<Self, InvalidTimestampFormat> {
        let format = format.into();
        InvalidTimestampFormat::check(&format)?;
        self.timestamp_format = format;
        Ok(self)
    }

    fn outcome_style(&self, outcome: Outcome) -> Style {
        match outcome {
            Outcome::Success => self.styles.pass,
            Outcome::SetupFailure | Outcome::TeardownFailure => self.styles.warn,
            Outcome::TestFailure | Outcome::Anomaly | Outcome::UnknownFailure => self.styles.fail,
        }
    }
}

impl Reporter for TextReporter {
    fn unit_line(&self, result: &UnitResult) -> String {
        let mut out = String::new();
        swrite!(
            out,
            "\t{} : {}",
            result.outcome().style(self.outcome_style(result.outcome())),
            result.name()
        );
        if let Some(stage) = result.stage() {
            swrite!(out, "::{stage}");
        }
        swrite!(out, " - {}\n", result.message());
        out
    }

    fn summary(&self, summary: &RunSummary) -> String {
        let mut out = String::new();
        swrite!(
            out,
            "Executed: {}/{} {}, {:.3}s at {}\n",
            summary.executed().style(self.styles.count),
            summary.total().style(self.styles.count),
            if summary.executed() > 1 { "units" } else { "unit" },
            summary.elapsed().as_secs_f64(),
            summary.timestamp().format(&self.timestamp_format),
        );
        swrite!(
            out,
            "Resulted: {}\n",
            summary.worst().style(self.outcome_style(summary.worst()))
        );
        if !summary.pattern().is_empty() {
            swrite!(out, "Matching: {}\n", summary.pattern());
        }
        out
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct Styles {
    pass: Style,
    warn: Style,
    fail: Style,
    count: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.pass = Style::new().green().bold();
        self.warn = Style::new().yellow().bold();
        self.fail = Style::new().red().bold();
        self.count = Style::new().bold();
    }
}
