// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, ExpressExitCode, Result,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser};
use express_filtering::TOKEN_SEPARATOR;
use express_runner::{Harness, config::ExpressConfig, reporter::TextReporter};
use std::io::Write;
use tracing::debug;

/// Runs the units registered in this program.
///
/// Units run in name order, one at a time, and a report is printed once every selected unit has
/// finished. The exit code is the severity of the worst outcome: 0 if every unit succeeded.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100
)]
pub struct ExpressApp {
    /// Select units matching every pattern [default: the configured pattern]
    ///
    /// Patterns support `*` (any run of characters), `?` (one character), `^X` (one character
    /// other than X) and a leading `!` to negate the whole pattern. A single pattern may also
    /// hold several `;`-separated patterns.
    #[arg(value_name = "PATTERN")]
    patterns: Vec<String>,

    /// List the selected units instead of running them
    #[arg(long, short)]
    list: bool,

    #[command(flatten)]
    config_opts: ConfigOpts,

    #[command(flatten)]
    output: OutputOpts,
}

impl ExpressApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Returns the selection pattern requested on the command line, or an empty string if none
    /// was.
    pub fn requested_pattern(&self) -> String {
        let mut requested = String::new();
        for pattern in self.patterns.iter().filter(|pattern| !pattern.is_empty()) {
            if !requested.is_empty() {
                requested.push(TOKEN_SEPARATOR);
            }
            requested.push_str(pattern);
        }
        requested
    }

    /// Executes the app against `harness`, returning the process exit code.
    pub fn exec(
        self,
        harness: &mut Harness,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let config = self.config_opts.make_config()?;
        harness.configure(&config);

        let pattern = self.requested_pattern();
        debug!(
            requested = pattern.as_str(),
            configured = harness.suite_pattern(),
            "resolved selection"
        );

        if self.list {
            let mut writer = output_writer.stdout_writer();
            for name in harness.selected_names(&pattern) {
                writeln!(writer, "{name}").map_err(ExpectedError::write_list_error)?;
            }
            writer.flush().map_err(ExpectedError::write_list_error)?;
            return Ok(ExpressExitCode::OK);
        }

        let mut reporter = TextReporter::new().with_timestamp_format(config.timestamp_format())?;
        if output.colorize_report() {
            reporter = reporter.colorize();
        }
        harness.set_reporter(reporter);

        let outcome = harness.run_all(&pattern)?;
        Ok(outcome.exit_code())
    }
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Config file [default: <current-dir>/.config/express.toml]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,
}

impl ConfigOpts {
    fn make_config(&self) -> Result<ExpressConfig> {
        let root = match &self.config_file {
            // The root is only used to find the default config file.
            Some(_) => Utf8PathBuf::new(),
            None => current_dir()?,
        };
        Ok(ExpressConfig::from_sources(&root, self.config_file.as_deref())?)
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let dir = std::env::current_dir().map_err(|err| ExpectedError::CurrentDirFailed { err })?;
    Utf8PathBuf::try_from(dir).map_err(|err| ExpectedError::CurrentDirInvalidUtf8 { err })
}
