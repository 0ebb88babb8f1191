// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destinations for rendered run reports.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

/// A destination for rendered run reports.
pub trait OutputSink {
    /// Writes a complete report.
    fn write_report(&mut self, report: &str) -> io::Result<()>;
}

/// Writes reports to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_report(&mut self, report: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        // Separate the report from whatever the host printed before the run.
        writeln!(stdout)?;
        stdout.write_all(report.as_bytes())?;
        stdout.flush()
    }
}

/// Collects reports in memory.
///
/// Clones share the same buffer, so a clone can be handed to a harness and the original inspected
/// afterwards.
#[derive(Clone, Debug, Default)]
pub struct BufferSink {
    buf: Arc<Mutex<String>>,
}

impl BufferSink {
    /// Creates a new, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    pub fn contents(&self) -> String {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OutputSink for BufferSink {
    fn write_report(&mut self, report: &str) -> io::Result<()> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(report);
        Ok(())
    }
}
