// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Outcome, Stage, UnitResult, quiet::QuietPanics};
use crate::{errors::UnitError, time::stopwatch};
use express_filtering::Selection;
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::Duration,
};
use tracing::{debug, trace};

/// A unit of testing: something that can be set up, tested, and torn down.
///
/// Units are registered with a [`Registry`](crate::registry::Registry) and executed by the
/// lifecycle runner, which calls [`setup`](Self::setup), then [`test`](Self::test), then
/// [`teardown`](Self::teardown). Teardown runs whenever setup succeeded, even if the test failed.
///
/// Each method may fail by returning a [`UnitError`] or by panicking. Either way the failure is
/// captured and recorded against the stage it happened in.
///
/// # Examples
///
/// ```
/// use express_runner::{errors::UnitError, runner::Unit, unit_assert};
///
/// struct Arithmetic {
///     values: Vec<i32>,
/// }
///
/// impl Unit for Arithmetic {
///     fn setup() -> Result<Self, UnitError> {
///         Ok(Self { values: vec![1, 2, 3] })
///     }
///
///     fn test(&mut self) -> Result<(), UnitError> {
///         let sum: i32 = self.values.iter().sum();
///         unit_assert!(sum == 6, "sum was {}", sum);
///         Ok(())
///     }
/// }
/// ```
pub trait Unit: Sized {
    /// Constructs and initializes the unit.
    fn setup() -> Result<Self, UnitError>;

    /// Runs the unit's test logic.
    fn test(&mut self) -> Result<(), UnitError>;

    /// Finalizes and releases the unit.
    ///
    /// The default implementation just drops `self`.
    fn teardown(self) -> Result<(), UnitError> {
        Ok(())
    }
}

/// Context passed to a unit's runner when it is executed as part of a run.
#[derive(Clone, Copy, Debug)]
pub struct RunContext<'a> {
    name: &'a str,
    selection: &'a Selection,
}

impl<'a> RunContext<'a> {
    /// Creates a new context.
    pub fn new(name: &'a str, selection: &'a Selection) -> Self {
        Self { name, selection }
    }

    /// Returns the name the unit is registered under.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the selection the current run was started with.
    pub fn selection(&self) -> &'a Selection {
        self.selection
    }
}

/// Executes a [`Unit`] through its full lifecycle, recording it under `name`.
pub fn execute_unit<T: Unit>(name: &str) -> UnitResult {
    execute(name, T::setup, T::test, T::teardown)
}

/// Executes a unit described by its three stages.
///
/// This is the core of the lifecycle runner: every failure signal raised by a stage is caught and
/// converted into exactly one [`UnitResult`].
///
/// * If `setup` fails, neither `body` nor `teardown` run.
/// * If `body` fails, `teardown` still runs, but a teardown failure doesn't replace the body's
///   failure.
/// * The elapsed time is measured from the start of setup until the stage that failed, or until
///   teardown finished.
pub fn execute<I>(
    name: &str,
    setup: impl FnOnce() -> Result<I, UnitError>,
    body: impl FnOnce(&mut I) -> Result<(), UnitError>,
    teardown: impl FnOnce(I) -> Result<(), UnitError>,
) -> UnitResult {
    let start = stopwatch();
    debug!(unit = name, "starting unit");

    trace!(unit = name, stage = %Stage::Setup, "entering stage");
    let mut instance = match catch_signal(setup) {
        Ok(instance) => instance,
        Err(signal) => return signal.into_result(name, Stage::Setup, start.elapsed()),
    };

    trace!(unit = name, stage = %Stage::Body, "entering stage");
    let body_failure = catch_signal(|| body(&mut instance))
        .err()
        .map(|signal| signal.into_result(name, Stage::Body, start.elapsed()));

    trace!(unit = name, stage = %Stage::Teardown, "entering stage");
    let teardown_result = catch_signal(|| teardown(instance));

    let result = match (body_failure, teardown_result) {
        (Some(failure), Ok(())) => failure,
        (Some(failure), Err(signal)) => {
            debug!(
                unit = name,
                error = signal.message(),
                "ignoring teardown failure after test failure"
            );
            failure
        }
        (None, Err(signal)) => signal.into_result(name, Stage::Teardown, start.elapsed()),
        (None, Ok(())) => UnitResult::success(name, start.elapsed()),
    };

    debug!(
        unit = name,
        outcome = %result.outcome(),
        elapsed = ?result.elapsed(),
        "finished unit"
    );
    result
}

/// A failure raised from a stage: either a returned error or a panic payload.
enum Signal {
    Error(UnitError),
    Panic(Box<dyn Any + Send>),
}

const UNKNOWN_MESSAGE: &str = "unknown";

fn catch_signal<T>(f: impl FnOnce() -> Result<T, UnitError>) -> Result<T, Signal> {
    // Stages own or exclusively borrow everything they touch, and a failed stage's state is never
    // observed again apart from teardown, which is the unit's own responsibility.
    let _quiet = QuietPanics::enter();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(Signal::Error(error)),
        Err(payload) => Err(Signal::Panic(payload)),
    }
}

impl Signal {
    /// Returns the message carried by this signal, if any.
    fn message(&self) -> &str {
        match self {
            Signal::Error(error) => error.message(),
            Signal::Panic(payload) => panic_message(payload.as_ref()).unwrap_or_default(),
        }
    }

    /// Classifies this signal as raised from `stage`.
    fn outcome(&self, stage: Stage) -> Outcome {
        match stage {
            Stage::Setup => Outcome::SetupFailure,
            Stage::Teardown => Outcome::TeardownFailure,
            Stage::Body => match self {
                Signal::Error(UnitError::Failure(_)) => Outcome::TestFailure,
                _ if self.message().is_empty() => Outcome::UnknownFailure,
                _ => Outcome::Anomaly,
            },
        }
    }

    fn into_result(self, name: &str, stage: Stage, elapsed: Duration) -> UnitResult {
        let outcome = self.outcome(stage);
        let message = match self.message() {
            // Assertion failures keep their message even if it's empty.
            "" if outcome != Outcome::TestFailure => UNKNOWN_MESSAGE,
            message => message,
        };
        UnitResult::failure(name, outcome, stage, message, elapsed)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        Some(s)
    } else {
        payload.downcast_ref::<String>().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_assert;
    use std::{
        cell::Cell,
        sync::atomic::{AtomicUsize, Ordering},
    };

    struct Passing;

    impl Unit for Passing {
        fn setup() -> Result<Self, UnitError> {
            Ok(Self)
        }

        fn test(&mut self) -> Result<(), UnitError> {
            unit_assert!(1 + 1 == 2);
            Ok(())
        }
    }

    #[test]
    fn passing_unit() {
        let result = execute_unit::<Passing>("Passing");
        assert_eq!(result.name(), "Passing");
        assert_eq!(result.outcome(), Outcome::Success);
        assert_eq!(result.stage(), None);
        assert_eq!(
            result.message(),
            format!("{:.3}s", result.elapsed().as_secs_f64())
        );
    }

    #[test]
    fn assertion_failure_in_body() {
        let result = execute(
            "Formatted",
            || Ok(()),
            |_| {
                unit_assert!(false, "x={}", 5);
                Ok(())
            },
            |_| Ok(()),
        );
        assert_eq!(result.outcome(), Outcome::TestFailure);
        assert_eq!(result.stage(), Some(Stage::Body));
        assert_eq!(result.message(), "x=5");
    }

    #[test]
    fn bare_assertion_has_empty_message() {
        let result = execute(
            "Bare",
            || Ok(()),
            |_| {
                unit_assert!(false);
                Ok(())
            },
            |_| Ok(()),
        );
        assert_eq!(result.outcome(), Outcome::TestFailure);
        assert_eq!(result.message(), "");
    }

    #[test]
    fn setup_failure_skips_body_and_teardown() {
        let body_ran = Cell::new(false);
        let teardown_ran = Cell::new(false);
        let result = execute(
            "Broken",
            || Err::<(), _>(UnitError::anomaly("no fixture")),
            |_| {
                body_ran.set(true);
                Ok(())
            },
            |_| {
                teardown_ran.set(true);
                Ok(())
            },
        );
        assert_eq!(result.outcome(), Outcome::SetupFailure);
        assert_eq!(result.stage(), Some(Stage::Setup));
        assert_eq!(result.message(), "no fixture");
        assert!(!body_ran.get(), "body must not run after setup fails");
        assert!(!teardown_ran.get(), "teardown must not run after setup fails");
    }

    #[test]
    fn setup_panic_is_captured() {
        let result = execute(
            "Panicky",
            || -> Result<(), UnitError> { panic!("cannot build") },
            |_| Ok(()),
            |_| Ok(()),
        );
        assert_eq!(result.outcome(), Outcome::SetupFailure);
        assert_eq!(result.message(), "cannot build");
    }

    #[test]
    fn body_panic_with_message_is_anomaly() {
        let result = execute(
            "Panicky",
            || Ok(()),
            |_| {
                let values: Vec<u32> = Vec::new();
                panic!("index {} out of range", values.len() + 3)
            },
            |_| Ok(()),
        );
        assert_eq!(result.outcome(), Outcome::Anomaly);
        assert_eq!(result.stage(), Some(Stage::Body));
        assert_eq!(result.message(), "index 3 out of range");
    }

    #[test]
    fn body_panic_without_message_is_unknown() {
        let result = execute(
            "Opaque",
            || Ok(()),
            |_| std::panic::panic_any(42_u32),
            |_| Ok(()),
        );
        assert_eq!(result.outcome(), Outcome::UnknownFailure);
        assert_eq!(result.stage(), Some(Stage::Body));
        assert_eq!(result.message(), "unknown");
    }

    #[test]
    fn body_error_converted_with_question_mark() {
        let result = execute(
            "Parse",
            || Ok(()),
            |_| {
                let _: u8 = "300".parse()?;
                Ok(())
            },
            |_| Ok(()),
        );
        assert_eq!(result.outcome(), Outcome::Anomaly);
        assert_eq!(result.message(), "number too large to fit in target type");
    }

    #[test]
    fn empty_anomaly_is_unknown() {
        let result = execute(
            "Empty",
            || Ok(()),
            |_| Err(UnitError::anomaly("")),
            |_| Ok(()),
        );
        assert_eq!(result.outcome(), Outcome::UnknownFailure);
        assert_eq!(result.message(), "unknown");
    }

    #[test]
    fn teardown_failure_after_success() {
        let result = execute(
            "Leaky",
            || Ok(()),
            |_| Ok(()),
            |_| Err(UnitError::anomaly("handle still open")),
        );
        assert_eq!(result.outcome(), Outcome::TeardownFailure);
        assert_eq!(result.stage(), Some(Stage::Teardown));
        assert_eq!(result.message(), "handle still open");
    }

    #[test]
    fn teardown_failure_does_not_replace_body_failure() {
        let teardowns = AtomicUsize::new(0);
        let result = execute(
            "Doubly",
            || Ok(()),
            |_| Err(UnitError::failure("first")),
            |_| {
                teardowns.fetch_add(1, Ordering::SeqCst);
                Err(UnitError::anomaly("second"))
            },
        );
        assert_eq!(teardowns.load(Ordering::SeqCst), 1, "teardown runs once");
        assert_eq!(result.outcome(), Outcome::TestFailure);
        assert_eq!(result.stage(), Some(Stage::Body));
        assert_eq!(result.message(), "first");
    }

    #[test]
    fn body_failure_elapsed_excludes_teardown() {
        let result = execute(
            "Slow",
            || Ok(()),
            |_| Err(UnitError::failure("fast")),
            |_| {
                std::thread::sleep(Duration::from_millis(100));
                Ok(())
            },
        );
        assert_eq!(result.outcome(), Outcome::TestFailure);
        assert!(
            result.elapsed() < Duration::from_millis(100),
            "elapsed {:?} stops at the body failure",
            result.elapsed()
        );
    }

    #[test]
    fn success_elapsed_includes_teardown() {
        let result = execute(
            "Slow",
            || Ok(()),
            |_| Ok(()),
            |_| {
                std::thread::sleep(Duration::from_millis(50));
                Ok(())
            },
        );
        assert!(result.outcome().is_success(), "{result:?}");
        assert!(
            result.elapsed() >= Duration::from_millis(50),
            "elapsed {:?} covers teardown",
            result.elapsed()
        );
    }

    #[test]
    fn teardown_panic_is_captured() {
        let result = execute(
            "Leaky",
            || Ok(()),
            |_| Ok(()),
            |()| -> Result<(), UnitError> { panic!("handle still open") },
        );
        assert_eq!(result.outcome(), Outcome::TeardownFailure);
        assert_eq!(result.stage(), Some(Stage::Teardown));
        assert_eq!(result.message(), "handle still open");
    }

    struct PanicsOnDrop;

    impl Unit for PanicsOnDrop {
        fn setup() -> Result<Self, UnitError> {
            Ok(Self)
        }

        fn test(&mut self) -> Result<(), UnitError> {
            Ok(())
        }
    }

    impl Drop for PanicsOnDrop {
        fn drop(&mut self) {
            panic!("failed to close");
        }
    }

    #[test]
    fn default_teardown_captures_drop_panic() {
        let result = execute_unit::<PanicsOnDrop>("PanicsOnDrop");
        assert_eq!(result.outcome(), Outcome::TeardownFailure);
        assert_eq!(result.stage(), Some(Stage::Teardown));
        assert_eq!(result.message(), "failed to close");
    }

    struct Counted {
        log: Vec<&'static str>,
    }

    thread_local! {
        static TORN_DOWN: Cell<usize> = const { Cell::new(0) };
    }

    impl Unit for Counted {
        fn setup() -> Result<Self, UnitError> {
            Ok(Self { log: vec!["setup"] })
        }

        fn test(&mut self) -> Result<(), UnitError> {
            self.log.push("test");
            unit_assert!(self.log == ["setup", "test"], "log was {:?}", self.log);
            Ok(())
        }

        fn teardown(self) -> Result<(), UnitError> {
            TORN_DOWN.with(|count| count.set(count.get() + 1));
            Ok(())
        }
    }

    #[test]
    fn stages_run_in_order() {
        let result = execute_unit::<Counted>("Counted");
        assert!(result.outcome().is_success(), "{result:?}");
        assert_eq!(TORN_DOWN.with(Cell::get), 1);
    }
}
