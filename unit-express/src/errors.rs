// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{ExpressExitCode, output::StderrStyles};
use camino::FromPathBufError;
use express_runner::errors::{ConfigParseError, InvalidTimestampFormat, WriteReportError};
use owo_colors::OwoColorize;
use std::{error::Error, io};
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders: errors are meant to be printed with display_to_stderr,
// which colorizes them.

/// An error that stopped unit-express before or after running units.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    CurrentDirFailed {
        #[source]
        err: io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        #[source]
        err: FromPathBufError,
    },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("invalid timestamp format")]
    InvalidTimestampFormat {
        #[from]
        err: InvalidTimestampFormat,
    },
    #[error("error writing unit list")]
    WriteListError {
        #[source]
        err: io::Error,
    },
    #[error("error writing run report")]
    WriteReportError {
        #[from]
        err: WriteReportError,
    },
}

impl ExpectedError {
    pub(crate) fn write_list_error(err: io::Error) -> Self {
        Self::WriteListError { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::InvalidTimestampFormat { .. } => ExpressExitCode::SETUP_ERROR,
            Self::WriteListError { .. } | Self::WriteReportError { .. } => {
                ExpressExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr, followed by its chain of causes.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { err } => {
                error!("could not determine current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { err } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    err.as_path().display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse config file `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::InvalidTimestampFormat { err } => {
                error!(
                    "report timestamp format `{}` is invalid",
                    err.format().style(styles.bold)
                );
                None
            }
            Self::WriteListError { err } => {
                error!("failed to write unit list to output");
                Some(err as &dyn Error)
            }
            Self::WriteReportError { err } => {
                error!("failed to write run report to output");
                err.source()
            }
        };

        while let Some(err) = next_error {
            error!(target: crate::output::NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
