// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The lifecycle runner.
//!
//! The main entry points in this module are the [`Unit`] trait and [`execute`], which runs a unit
//! through setup, test and teardown and turns whatever happens into a [`UnitResult`].

mod imp;
mod quiet;
mod status;

pub use imp::*;
pub use status::*;
