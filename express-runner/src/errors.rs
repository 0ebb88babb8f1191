// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by unit-express.

use camino::Utf8PathBuf;
use chrono::format::{Item, StrftimeItems};
use config::ConfigError;
use std::{error, fmt, io};
use thiserror::Error;

/// The failure signal raised from a unit's setup, test or teardown.
///
/// Units return this from their lifecycle methods. It is usually produced by
/// [`unit_assert!`](crate::unit_assert), or by `?` on any other error type, which converts it into
/// an anomaly carrying that error's message.
///
/// Like `anyhow::Error`, this type deliberately does not implement [`std::error::Error`]: doing so
/// would conflict with the blanket conversion from every error type.
pub enum UnitError {
    /// An assertion failed.
    Failure(String),

    /// Some other error occurred. An empty message means nothing useful could be extracted from
    /// it.
    Anomaly(String),
}

impl UnitError {
    /// Creates a new assertion failure with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Creates a new anomaly with the given message.
    pub fn anomaly(message: impl Into<String>) -> Self {
        Self::Anomaly(message.into())
    }

    /// Returns the message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Failure(message) | Self::Anomaly(message) => message,
        }
    }
}

impl<E> From<E> for UnitError
where
    E: error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::Anomaly(err.to_string())
    }
}

impl fmt::Debug for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(message) => f.debug_tuple("Failure").field(message).finish(),
            Self::Anomaly(message) => f.debug_tuple("Anomaly").field(message).finish(),
        }
    }
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(message) => write!(f, "assertion failed: {message}"),
            Self::Anomaly(message) if message.is_empty() => write!(f, "unknown failure"),
            Self::Anomaly(message) => f.write_str(message),
        }
    }
}

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse unit-express config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }
}

/// An error that occurred while writing a run report to its output sink.
#[derive(Debug, Error)]
#[error("error writing run report")]
#[non_exhaustive]
pub struct WriteReportError {
    #[source]
    err: io::Error,
}

impl WriteReportError {
    pub(crate) fn new(err: io::Error) -> Self {
        Self { err }
    }

    /// Returns the underlying I/O error.
    pub fn io_error(&self) -> &io::Error {
        &self.err
    }
}

/// A strftime-style timestamp format that can't be rendered.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid timestamp format `{format}`")]
pub struct InvalidTimestampFormat {
    format: String,
}

impl InvalidTimestampFormat {
    pub(crate) fn check(format: &str) -> Result<(), Self> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            Err(Self {
                format: format.to_owned(),
            })
        } else {
            Ok(())
        }
    }

    /// Returns the rejected format.
    pub fn format(&self) -> &str {
        &self.format
    }
}
