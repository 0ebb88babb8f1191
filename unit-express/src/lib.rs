// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A minimal in-process unit test harness.
//!
//! Units are types implementing [`Unit`] (or plain functions), registered with a [`Harness`] and
//! run in name order through setup, test and teardown. Which units run is controlled by wildcard
//! selection patterns given on the command line or in `.config/express.toml`.
//!
//! The simplest way to use unit-express is to hand [`main_with`] a registration closure:
//!
//! ```no_run
//! use unit_express::{Unit, UnitError, unit_assert};
//!
//! struct Arithmetic;
//!
//! impl Unit for Arithmetic {
//!     fn setup() -> Result<Self, UnitError> {
//!         Ok(Self)
//!     }
//!
//!     fn test(&mut self) -> Result<(), UnitError> {
//!         unit_assert!(2 + 2 == 4);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> color_eyre::Result<()> {
//!     unit_express::main_with(|harness| {
//!         harness.register_unit::<Arithmetic>();
//!     })
//! }
//! ```
//!
//! The process then exits with the severity of the worst outcome, so `0` means every selected
//! unit succeeded.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

pub use dispatch::ExpressApp;
#[doc(hidden)]
pub use errors::ExpectedError;
pub(crate) use errors::Result;
pub use exit_codes::ExpressExitCode;
pub use express_runner::{
    Harness, Outcome, Sentinel, Unit, UnitError, UnitMarker, register_fn, register_unit,
    register_unit_marked, run_all, suite, unit_assert,
};
pub use output::{Color, OutputContext, OutputWriter, StderrStyles};

use clap::Parser;

/// Parses the command line, registers units with `register`, runs them, and exits the process.
///
/// The exit code is [`Outcome::exit_code`] of the worst outcome, or one of the
/// [`ExpressExitCode`] values if something went wrong outside of the units.
pub fn main_with(register: impl FnOnce(&mut Harness)) -> color_eyre::Result<()> {
    // The runner silences the panic hook while units run and reports their panics itself, so
    // only the error report hook is installed.
    let (_panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install()?;
    let _ = enable_ansi_support::enable_ansi_support();

    let app = ExpressApp::parse();
    let output = app.init_output();

    let mut harness = Harness::new();
    register(&mut harness);

    match app.exec(&mut harness, output, &mut OutputWriter::default()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            std::process::exit(error.process_exit_code())
        }
    }
}
