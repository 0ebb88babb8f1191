// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Selection patterns for [unit-express](https://docs.rs/unit-express).
//!
//! A selection pattern is a `;`-separated list of wildcard tokens, all of which must match a unit
//! name for the unit to be run. See [`wildcard`] for the wildcard alphabet.

mod selection;
pub mod wildcard;

pub use selection::{FilterMatch, Selection, SuitePattern, TOKEN_SEPARATOR};
