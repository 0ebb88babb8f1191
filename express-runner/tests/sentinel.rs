// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-runs through the sentinel. This lives in its own test binary because the sentinel drives
//! the process-wide harness.

use express_runner::{Outcome, Sentinel, UnitError, register_fn, reporter::BufferSink, with_global};
use pretty_assertions::assert_eq;

#[test]
fn latest_sentinel_runs_once() {
    let sink = BufferSink::new();
    with_global(|harness| {
        harness.set_sink(sink.clone());
    });

    register_fn("First", || Ok(()));
    let first = Sentinel::arm();
    register_fn("Second", || Err(UnitError::anomaly("boom")));
    let second = Sentinel::arm();

    assert!(!first.is_armed());
    assert!(second.is_armed());

    // Dropping a superseded sentinel does nothing.
    drop(first);
    assert_eq!(sink.contents(), "");
    with_global(|harness| assert!(!harness.has_run()));

    // The live sentinel runs everything with the configured (empty) pattern.
    drop(second);
    let report = sink.contents();
    assert!(report.starts_with("\tSUCCESS : First - "), "{report}");
    assert!(report.contains("\tANOMALY : Second::test() - boom\n"), "{report}");
    assert!(report.contains("Executed: 2/2 units, "), "{report}");
    assert!(report.ends_with("Resulted: ANOMALY\n"), "{report}");
    with_global(|harness| assert!(harness.has_run()));

    // Once a run has happened, later sentinels don't run again.
    {
        let _third = Sentinel::arm();
    }
    assert_eq!(sink.contents(), report);
    assert_eq!(Sentinel::arm().fire(), None::<Outcome>);

    let disarmed = Sentinel::arm();
    disarmed.disarm();
    assert_eq!(sink.contents(), report);
}
