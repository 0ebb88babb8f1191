// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The harness: a registry together with everything needed to run it.
//!
//! A [`Harness`] can be owned directly, which is what tests and embedding programs usually want.
//! There is also a process-wide harness behind the free functions in this module ([`register_unit`],
//! [`suite`], [`run_all`] and friends), which is what the [`Sentinel`](crate::sentinel::Sentinel)
//! runs.

use crate::{
    config::ExpressConfig,
    errors::{UnitError, WriteReportError},
    registry::{Registry, UnitDescriptor, UnitMarker},
    reporter::{OutputSink, Reporter, RunAggregator, RunSummary, StdoutSink, TextReporter},
    runner::{Outcome, RunContext, Unit, UnitResult},
};
use express_filtering::{FilterMatch, Selection, SuitePattern};
use std::{
    fmt,
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, trace, warn};

/// A registry of units, plus the configured selection, reporter and output sink used to run them.
pub struct Harness {
    registry: Registry,
    suite: SuitePattern,
    reporter: Arc<dyn Reporter + Send + Sync>,
    sink: Box<dyn OutputSink + Send>,
    last_registered: Option<String>,
    has_run: bool,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Creates a new harness with an empty registry, reporting in plain text to stdout.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            suite: SuitePattern::new(),
            reporter: Arc::new(TextReporter::new()),
            sink: Box::new(StdoutSink),
            last_registered: None,
            has_run: false,
        }
    }

    /// Replaces the reporter used to render results.
    pub fn set_reporter(&mut self, reporter: impl Reporter + Send + Sync + 'static) -> &mut Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Replaces the sink that rendered reports are written to.
    pub fn set_sink(&mut self, sink: impl OutputSink + Send + 'static) -> &mut Self {
        self.sink = Box::new(sink);
        self
    }

    /// Applies the settings from `config` that concern the harness itself.
    pub fn configure(&mut self, config: &ExpressConfig) -> &mut Self {
        self.suite.configure(config.pattern());
        self
    }

    // ---
    // Registration
    // ---

    /// Registers a runner under `name`. See [`Registry::register`].
    pub fn register<F>(&mut self, name: impl Into<String>, runner: F) -> bool
    where
        F: Fn(&RunContext<'_>) -> UnitResult + Send + Sync + 'static,
    {
        let name = name.into();
        self.last_registered = Some(name.clone());
        self.registry.register(name, runner)
    }

    /// Registers the unit type `T` under its type name, returning that name.
    pub fn register_unit<T: Unit + 'static>(&mut self) -> String {
        self.register_unit_marked::<T>(UnitMarker::None)
    }

    /// Registers the unit type `T` under its type name, applying `marker` to the suite pattern.
    pub fn register_unit_marked<T: Unit + 'static>(&mut self, marker: UnitMarker) -> String {
        let name = self.registry.register_unit::<T>();
        if let Some(pattern) = marker.suite_pattern(&name) {
            self.suite(&pattern);
        }
        self.last_registered = Some(name.clone());
        name
    }

    /// Registers the unit type `T` under an explicit name.
    pub fn register_unit_as<T: Unit + 'static>(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        self.last_registered = Some(name.clone());
        self.registry.register_unit_as::<T>(name)
    }

    /// Registers a unit consisting of just a test body.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, body: F) -> bool
    where
        F: Fn() -> Result<(), UnitError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.last_registered = Some(name.clone());
        self.registry.register_fn(name, body)
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the name of the most recently registered unit.
    pub fn last_registered(&self) -> Option<&str> {
        self.last_registered.as_deref()
    }

    // ---
    // Selection
    // ---

    /// Merges `pattern` into the configured suite pattern, returning the result.
    ///
    /// See [`SuitePattern::configure`] for how patterns are merged.
    pub fn suite(&mut self, pattern: &str) -> &str {
        let configured = self.suite.configure(pattern);
        debug!(pattern = configured, "configured suite pattern");
        configured
    }

    /// Returns the configured suite pattern.
    pub fn suite_pattern(&self) -> &str {
        self.suite.as_str()
    }

    /// Returns the selection a run requested with `requested` would use.
    pub fn selection(&self, requested: &str) -> Selection {
        self.suite.resolve(requested)
    }

    /// Returns the names of the units a run requested with `requested` would execute.
    pub fn selected_names(&self, requested: &str) -> Vec<&str> {
        let selection = self.selection(requested);
        self.registry
            .names()
            .filter(|name| selection.is_match(name))
            .collect()
    }

    // ---
    // Running
    // ---

    /// Returns true if a run has been started on this harness.
    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// Runs every unit selected by `requested` (or by the suite pattern, if `requested` is empty)
    /// and writes the report, returning the worst outcome.
    pub fn run_all(&mut self, requested: &str) -> Result<Outcome, WriteReportError> {
        self.run(requested).map(|summary| summary.worst())
    }

    /// Like [`run_all`](Self::run_all), but returns the full summary.
    pub fn run(&mut self, requested: &str) -> Result<RunSummary, WriteReportError> {
        let summary = self.prepare_run(requested).execute();
        self.emit(&summary)?;
        Ok(summary)
    }

    /// Snapshots the units selected for a run, marking this harness as having run.
    ///
    /// The returned [`PreparedRun`] doesn't borrow the harness, so units can be executed without
    /// holding on to it.
    pub fn prepare_run(&mut self, requested: &str) -> PreparedRun {
        self.has_run = true;
        let selection = self.selection(requested);

        let units = self
            .registry
            .iter()
            .filter(|descriptor| match selection.filter_match(descriptor.name()) {
                FilterMatch::Matches => true,
                FilterMatch::Mismatch { token } => {
                    trace!(unit = descriptor.name(), %token, "unit not selected");
                    false
                }
            })
            .cloned()
            .collect();

        PreparedRun {
            selection,
            units,
            total: self.registry.len(),
            reporter: Arc::clone(&self.reporter),
        }
    }

    /// Renders `summary` and writes it to the output sink.
    pub fn emit(&mut self, summary: &RunSummary) -> Result<(), WriteReportError> {
        let report = summary.render(self.reporter.as_ref());
        self.sink
            .write_report(&report)
            .map_err(WriteReportError::new)
    }
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("registry", &self.registry)
            .field("suite", &self.suite)
            .field("last_registered", &self.last_registered)
            .field("has_run", &self.has_run)
            .finish_non_exhaustive()
    }
}

/// The units selected for a run, ready to be executed.
#[derive(Clone)]
pub struct PreparedRun {
    selection: Selection,
    units: Vec<UnitDescriptor>,
    total: usize,
    reporter: Arc<dyn Reporter + Send + Sync>,
}

impl PreparedRun {
    /// Returns the selection this run was prepared with.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns the number of units that will be executed.
    pub fn run_count(&self) -> usize {
        self.units.len()
    }

    /// Executes every selected unit in order, one at a time.
    pub fn execute(self) -> RunSummary {
        debug!(
            pattern = self.selection.as_str(),
            run_count = self.units.len(),
            total = self.total,
            "starting run"
        );

        let mut aggregator = RunAggregator::new(self.total);
        for descriptor in &self.units {
            let cx = RunContext::new(descriptor.name(), &self.selection);
            let result = descriptor.run(&cx);
            aggregator.record(&result, self.reporter.as_ref());
        }

        let summary = aggregator.finish(self.selection.as_str());
        debug!(worst = %summary.worst(), "finished run");
        summary
    }
}

impl fmt::Debug for PreparedRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRun")
            .field("selection", &self.selection)
            .field("units", &self.units)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

// ---
// The process-wide harness
// ---

static GLOBAL: LazyLock<Mutex<Harness>> = LazyLock::new(|| Mutex::new(Harness::new()));

fn global() -> MutexGuard<'static, Harness> {
    // A panic while holding the lock can only come from a reporter or sink, and leaves the harness
    // in a consistent state.
    GLOBAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Calls `f` with the process-wide harness.
///
/// Don't run units from within `f`: use [`run_all`] instead, which releases the harness while
/// units execute.
pub fn with_global<R>(f: impl FnOnce(&mut Harness) -> R) -> R {
    f(&mut global())
}

/// Registers the unit type `T` with the process-wide harness, returning its name.
pub fn register_unit<T: Unit + 'static>() -> String {
    global().register_unit::<T>()
}

/// Registers the unit type `T` with the process-wide harness, applying `marker`.
pub fn register_unit_marked<T: Unit + 'static>(marker: UnitMarker) -> String {
    global().register_unit_marked::<T>(marker)
}

/// Registers a unit consisting of just a test body with the process-wide harness.
pub fn register_fn<F>(name: impl Into<String>, body: F) -> bool
where
    F: Fn() -> Result<(), UnitError> + Send + Sync + 'static,
{
    global().register_fn(name, body)
}

/// Merges `pattern` into the process-wide suite pattern, returning the result.
pub fn suite(pattern: &str) -> String {
    global().suite(pattern).to_owned()
}

/// Runs the process-wide harness, returning the worst outcome.
///
/// Failures to write the report are logged, and don't change the outcome.
pub fn run_all(pattern: &str) -> Outcome {
    let prepared = global().prepare_run(pattern);
    run_prepared(prepared)
}

/// Runs the process-wide harness with its suite pattern, unless it has already been run.
pub(crate) fn auto_run(unit: Option<&str>) -> Option<Outcome> {
    let prepared = {
        let mut harness = global();
        if harness.has_run() {
            debug!(unit, "skipping auto-run: units were already run explicitly");
            return None;
        }
        harness.prepare_run("")
    };
    debug!(unit, "auto-running registered units");
    Some(run_prepared(prepared))
}

fn run_prepared(prepared: PreparedRun) -> Outcome {
    let summary = prepared.execute();
    if let Err(error) = global().emit(&summary) {
        warn!(%error, cause = %error.io_error(), "run report was not written");
    }
    summary.worst()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reporter::BufferSink, unit_assert};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn harness_with_buffer() -> (Harness, BufferSink) {
        let sink = BufferSink::new();
        let mut harness = Harness::new();
        harness.set_sink(sink.clone());
        (harness, sink)
    }

    fn register_greek(harness: &mut Harness) {
        harness.register_fn("Alpha", || Ok(()));
        harness.register_fn("Beta1", || Ok(()));
        harness.register_fn("Beta2", || {
            unit_assert!(false, "x={}", 5);
            Ok(())
        });
        harness.register_fn("Gamma", || Ok(()));
    }

    /// Replaces the timing-dependent parts of a report.
    fn redact(report: &str) -> String {
        report
            .lines()
            .map(|line| {
                if let Some(rest) = line.strip_prefix("\tSUCCESS : ") {
                    let name = rest.split(" - ").next().unwrap_or(rest);
                    format!("\tSUCCESS : {name} - <elapsed>")
                } else if line.starts_with("Executed: ") {
                    let counts = line.split(',').next().unwrap_or(line);
                    format!("{counts}, <elapsed> at <timestamp>")
                } else {
                    line.to_owned()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_pattern_runs_everything() {
        let (mut harness, sink) = harness_with_buffer();
        register_greek(&mut harness);

        let summary = harness.run("").expect("buffer sink never fails");
        assert_eq!(summary.executed(), 4);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.worst(), Outcome::TestFailure);
        assert_eq!(
            redact(&sink.contents()),
            "\tSUCCESS : Alpha - <elapsed>\n\
             \tSUCCESS : Beta1 - <elapsed>\n\
             \tTEST-FAILURE : Beta2::test() - x=5\n\
             \tSUCCESS : Gamma - <elapsed>\n\
             Executed: 4/4 units, <elapsed> at <timestamp>\n\
             Resulted: TEST-FAILURE"
        );
    }

    #[test]
    fn pattern_selects_subset() {
        let (mut harness, sink) = harness_with_buffer();
        register_greek(&mut harness);

        let outcome = harness.run_all("Beta*;!*2").expect("buffer sink never fails");
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(
            redact(&sink.contents()),
            "\tSUCCESS : Beta1 - <elapsed>\n\
             Executed: 1/4 unit, <elapsed> at <timestamp>\n\
             Resulted: SUCCESS\n\
             Matching: Beta*;!*2"
        );
    }

    #[test]
    fn nothing_selected_is_success() {
        let (mut harness, _sink) = harness_with_buffer();
        register_greek(&mut harness);

        let summary = harness.run("Delta").expect("buffer sink never fails");
        assert_eq!(summary.executed(), 0);
        assert_eq!(summary.worst(), Outcome::Success);
    }

    #[test]
    fn setup_failure_prevents_body() {
        static BODY_RAN: AtomicBool = AtomicBool::new(false);

        struct NoFixture;

        impl Unit for NoFixture {
            fn setup() -> Result<Self, UnitError> {
                Err(UnitError::anomaly("fixture missing"))
            }

            fn test(&mut self) -> Result<(), UnitError> {
                BODY_RAN.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let (mut harness, sink) = harness_with_buffer();
        harness.register_unit::<NoFixture>();
        assert_eq!(
            harness.run_all("").expect("buffer sink never fails"),
            Outcome::SetupFailure
        );
        assert!(!BODY_RAN.load(Ordering::SeqCst));
        assert!(
            sink.contents()
                .starts_with("\tSETUP-FAILURE : NoFixture::setup() - fixture missing\n")
        );
    }

    #[test]
    fn one_result_per_selected_unit() {
        let (mut harness, _sink) = harness_with_buffer();
        register_greek(&mut harness);
        harness.register_fn("Panicky", || panic!("boom"));

        let summary = harness.run("").expect("buffer sink never fails");
        assert_eq!(summary.executed(), 5);
        assert_eq!(summary.unit_report().lines().count(), 5);
        assert_eq!(summary.worst(), Outcome::Anomaly);
    }

    #[test]
    fn suite_pattern_applies_to_empty_requests() {
        let (mut harness, _sink) = harness_with_buffer();
        register_greek(&mut harness);
        harness.suite("Beta*");

        assert_eq!(harness.selected_names(""), ["Beta1", "Beta2"]);
        assert_eq!(harness.selected_names("Gamma"), ["Gamma"]);

        let summary = harness.run("").expect("buffer sink never fails");
        assert_eq!(summary.pattern(), "Beta*");
        assert_eq!(summary.executed(), 2);
    }

    #[test]
    fn markers_configure_suite() {
        struct Focus;

        impl Unit for Focus {
            fn setup() -> Result<Self, UnitError> {
                Ok(Self)
            }

            fn test(&mut self) -> Result<(), UnitError> {
                Ok(())
            }
        }

        let (mut harness, _sink) = harness_with_buffer();
        register_greek(&mut harness);
        harness.register_unit_marked::<Focus>(UnitMarker::Skip);
        assert_eq!(harness.suite_pattern(), "!Focus");
        assert_eq!(harness.last_registered(), Some("Focus"));
        assert_eq!(
            harness.selected_names(""),
            ["Alpha", "Beta1", "Beta2", "Gamma"]
        );

        harness.register_unit_marked::<Focus>(UnitMarker::Only);
        assert_eq!(harness.suite_pattern(), "Focus");
        assert_eq!(harness.selected_names(""), ["Focus"]);
    }

    #[test]
    fn configure_from_config() {
        let (mut harness, _sink) = harness_with_buffer();
        harness.configure(&ExpressConfig::default_config());
        assert_eq!(harness.suite_pattern(), "");
    }

    #[test]
    fn tracks_runs() {
        let (mut harness, _sink) = harness_with_buffer();
        assert!(!harness.has_run());
        let prepared = harness.prepare_run("");
        assert!(harness.has_run());
        assert_eq!(prepared.run_count(), 0);
        assert!(prepared.selection().is_all());
    }
}
