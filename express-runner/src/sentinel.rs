// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A drop guard that runs the process-wide harness if nothing else did.

use crate::{harness, runner::Outcome};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static GENERATION: AtomicU64 = AtomicU64::new(0);

/// Runs every unit registered with the process-wide harness when dropped, unless a run already
/// happened.
///
/// Only the most recently armed sentinel is live: arming a new one disarms all earlier ones, so
/// at most one automatic run takes place. Prefer calling [`run_all`](crate::run_all) explicitly;
/// this is a fallback for hosts that only register units.
///
/// ```no_run
/// use express_runner::{Sentinel, register_fn};
///
/// fn main() {
///     register_fn("Smoke", || Ok(()));
///     let _sentinel = Sentinel::arm();
///     // ... the report is printed when `_sentinel` goes out of scope.
/// }
/// ```
#[derive(Debug)]
#[must_use = "a sentinel runs registered units when dropped, so binding it to `_` fires immediately"]
pub struct Sentinel {
    generation: u64,
    unit: Option<String>,
}

impl Sentinel {
    /// Arms a new sentinel, disarming every earlier one.
    pub fn arm() -> Self {
        let generation = GENERATION.fetch_add(1, Ordering::SeqCst) + 1;
        let unit = harness::with_global(|harness| harness.last_registered().map(str::to_owned));
        debug!(generation, ?unit, "armed sentinel");
        Self { generation, unit }
    }

    /// Returns true if dropping this sentinel would trigger a run.
    pub fn is_armed(&self) -> bool {
        self.generation != 0 && self.generation == GENERATION.load(Ordering::SeqCst)
    }

    /// Disarms this sentinel without running anything.
    pub fn disarm(mut self) {
        self.generation = 0;
    }

    /// Fires this sentinel now, returning the outcome if a run happened.
    pub fn fire(mut self) -> Option<Outcome> {
        self.fire_impl()
    }

    fn fire_impl(&mut self) -> Option<Outcome> {
        if !self.is_armed() {
            return None;
        }
        self.generation = 0;
        harness::auto_run(self.unit.as_deref())
    }
}

impl Drop for Sentinel {
    fn drop(&mut self) {
        self.fire_impl();
    }
}
