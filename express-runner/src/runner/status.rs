// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{fmt, time::Duration};

/// The outcome of running a single unit, or the worst outcome across a run.
///
/// Outcomes are ordered by severity, so the worst outcome of a run is the maximum over its units.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Outcome {
    /// The unit ran through setup, test and teardown without failing.
    #[default]
    Success = 0,

    /// The unit failed while being set up.
    SetupFailure = 1,

    /// An assertion in the unit's test failed.
    TestFailure = 2,

    /// The unit failed while being torn down.
    TeardownFailure = 3,

    /// The unit's test raised an error or panic with a usable message.
    Anomaly = 4,

    /// The unit's test raised an error or panic with no usable message.
    UnknownFailure = 5,
}

impl Outcome {
    /// Returns all outcomes in order of increasing severity.
    pub fn variants() -> [Self; 6] {
        [
            Self::Success,
            Self::SetupFailure,
            Self::TestFailure,
            Self::TeardownFailure,
            Self::Anomaly,
            Self::UnknownFailure,
        ]
    }

    /// Returns the label used for this outcome in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::SetupFailure => "SETUP-FAILURE",
            Self::TestFailure => "TEST-FAILURE",
            Self::TeardownFailure => "TEARDOWN-FAILURE",
            Self::Anomaly => "ANOMALY",
            Self::UnknownFailure => "UNKNOWN-FAILURE",
        }
    }

    /// Returns the severity of this outcome as a process exit code.
    ///
    /// `Success` is 0, and more severe outcomes have larger codes.
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    /// Returns true if this is [`Outcome::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The lifecycle stage a unit was in when it failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Stage {
    /// Constructing the unit.
    Setup,

    /// Running the unit's test.
    Body,

    /// Releasing the unit.
    Teardown,
}

impl Stage {
    /// Returns the label used for this stage in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Setup => "setup()",
            Self::Body => "test()",
            Self::Teardown => "teardown()",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The result of running a single unit.
///
/// A failing result always carries the stage it failed in, and a successful one never does.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnitResult {
    name: String,
    outcome: Outcome,
    stage: Option<Stage>,
    message: String,
    elapsed: Duration,
}

impl UnitResult {
    /// Creates a successful result. The message is the elapsed time in seconds.
    pub fn success(name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Success,
            stage: None,
            message: format!("{:.3}s", elapsed.as_secs_f64()),
            elapsed,
        }
    }

    /// Creates a failing result. `outcome` must not be [`Outcome::Success`].
    pub(crate) fn failure(
        name: impl Into<String>,
        outcome: Outcome,
        stage: Stage,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        assert!(
            !outcome.is_success(),
            "a failing result must not have a success outcome"
        );
        Self {
            name: name.into(),
            outcome,
            stage: Some(stage),
            message: message.into(),
            elapsed,
        }
    }

    /// Returns the name of the unit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns the stage the unit failed in, or `None` if it succeeded.
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Returns the failure message, or the elapsed time for successful units.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the time taken from the start of setup until the unit finished or failed.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
