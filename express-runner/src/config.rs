// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for unit-express.
//!
//! The config is read from an optional TOML file layered over the defaults in
//! `default-config.toml`.

use crate::errors::{ConfigParseError, InvalidTimestampFormat};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

/// Overall configuration for unit-express.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ExpressConfig {
    run: RunConfig,
    report: ReportConfig,
}

impl ExpressConfig {
    /// The default location of the config within the directory the host runs from.
    pub const CONFIG_PATH: &'static str = ".config/express.toml";

    /// Contains the default config as a TOML file.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config, looking for it at `config_file` if given, otherwise at
    /// [`Self::CONFIG_PATH`] under `root`.
    ///
    /// An explicitly specified file must exist. The default location is optional.
    pub fn from_sources(
        root: impl AsRef<Utf8Path>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = root.as_ref().join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        Self::build_and_deserialize(builder, config_file)
    }

    /// Returns the default config.
    pub fn default_config() -> Self {
        let config = Self::make_default_config()
            .build()
            .expect("default config is always valid");
        config
            .try_deserialize()
            .expect("default config is always valid")
    }

    /// Returns the selection pattern configured for runs requested without one.
    pub fn pattern(&self) -> &str {
        &self.run.pattern
    }

    /// Returns the strftime-style format for the summary timestamp.
    pub fn timestamp_format(&self) -> &str {
        &self.report.timestamp_format
    }

    fn make_default_config() -> config::ConfigBuilder<config::builder::DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        config_file: Utf8PathBuf,
    ) -> Result<Self, ConfigParseError> {
        let config = match builder.build() {
            Ok(config) => config,
            Err(err) => return Err(ConfigParseError::new(config_file, err)),
        };
        let this: Self = match config.try_deserialize() {
            Ok(this) => this,
            Err(err) => return Err(ConfigParseError::new(config_file, err)),
        };

        if let Err(err) = InvalidTimestampFormat::check(this.timestamp_format()) {
            return Err(ConfigParseError::new(
                config_file,
                ConfigError::Message(format!("report.timestamp-format: {err}")),
            ));
        }

        Ok(this)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct RunConfig {
    pattern: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
struct ReportConfig {
    timestamp_format: String,
}
