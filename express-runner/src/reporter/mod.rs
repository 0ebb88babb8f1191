// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report the results of a run.
//!
//! Results are folded into a [`RunSummary`] by a [`RunAggregator`], rendered by a [`Reporter`] and
//! written out through an [`OutputSink`].

mod aggregator;
mod displayer;
mod sink;

pub use aggregator::*;
pub use displayer::*;
pub use sink::*;
