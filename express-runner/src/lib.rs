// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [unit-express](https://docs.rs/unit-express), a minimal in-process unit
//! test harness.
//!
//! The basic flow is:
//!
//! 1. Implement [`Unit`] for a type (or write a plain function), and register it with a
//!    [`Harness`] or with the process-wide harness through [`register_unit`].
//! 2. Call [`run_all`] with a selection pattern. Every registered unit whose name matches is run
//!    through setup, test and teardown, in name order.
//! 3. The report is written to the harness's output sink, and the worst [`Outcome`] is returned.
//!
//! ```
//! use express_runner::{Harness, Outcome, Unit, UnitError, reporter::BufferSink, unit_assert};
//!
//! struct Arithmetic {
//!     x: i32,
//! }
//!
//! impl Unit for Arithmetic {
//!     fn setup() -> Result<Self, UnitError> {
//!         Ok(Self { x: 2 })
//!     }
//!
//!     fn test(&mut self) -> Result<(), UnitError> {
//!         unit_assert!(self.x + self.x == 4, "x={}", self.x);
//!         Ok(())
//!     }
//! }
//!
//! let mut harness = Harness::new();
//! harness.set_sink(BufferSink::new());
//! harness.register_unit::<Arithmetic>();
//! assert_eq!(harness.run_all("").unwrap(), Outcome::Success);
//! ```

mod assertions;
pub mod config;
pub mod errors;
pub mod harness;
pub mod registry;
pub mod reporter;
pub mod runner;
pub mod sentinel;
mod time;

pub use errors::UnitError;
pub use harness::{
    Harness, register_fn, register_unit, register_unit_marked, run_all, suite, with_global,
};
pub use registry::UnitMarker;
pub use runner::{Outcome, Unit};
pub use sentinel::Sentinel;
