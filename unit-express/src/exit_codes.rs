// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for unit-express failures.
///
/// A completed run exits with [`Outcome::exit_code`](express_runner::Outcome::exit_code) of its
/// worst outcome, which is always below 8. The codes here are for failures outside of units.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum ExpressExitCode {}

impl ExpressExitCode {
    /// No errors occurred and every selected unit succeeded.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up a run, for example an invalid config file.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
