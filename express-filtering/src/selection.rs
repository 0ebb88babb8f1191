// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-token selection patterns.

use crate::wildcard::{has_wildcards, matches};
use std::fmt;

/// The separator between tokens of a selection pattern.
pub const TOKEN_SEPARATOR: char = ';';

/// A selection pattern: a list of wildcard tokens separated by `;`.
///
/// A name is selected only if it matches *every* token. Empty tokens are ignored, so an empty
/// pattern (or one consisting only of separators) selects every name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Selection {
    pattern: String,
    tokens: Vec<String>,
}

impl Selection {
    /// Parses a selection pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let tokens = pattern
            .split(TOKEN_SEPARATOR)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect();
        Self { pattern, tokens }
    }

    /// Returns a selection that matches every name.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns the pattern this selection was created from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns true if this selection matches every name.
    pub fn is_all(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the individual tokens of this selection.
    pub fn tokens(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.tokens.iter().map(String::as_str)
    }

    /// Returns true if `name` matches every token.
    pub fn is_match(&self, name: &str) -> bool {
        self.filter_match(name).is_match()
    }

    /// Returns an enum describing whether `name` is selected, and if not, which token rejected it.
    pub fn filter_match(&self, name: &str) -> FilterMatch {
        match self.tokens.iter().find(|token| !matches(name, token)) {
            Some(token) => FilterMatch::Mismatch {
                token: token.clone(),
            },
            None => FilterMatch::Matches,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// An enum describing whether a name matches a [`Selection`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterMatch {
    /// The name matches every token.
    Matches,

    /// The name does not match the selection.
    Mismatch {
        /// The first token that the name failed to match.
        token: String,
    },
}

impl FilterMatch {
    /// Returns true if the name matched.
    pub fn is_match(&self) -> bool {
        matches!(self, FilterMatch::Matches)
    }
}

/// The selection pattern configured for a process, used whenever a run is requested without an
/// explicit pattern.
///
/// Patterns are merged as they're configured:
///
/// * The first non-empty pattern is always taken.
/// * Once a plain name (no wildcards) is configured, it is kept for good: selecting a single unit
///   takes priority over everything else.
/// * While the configured pattern has wildcards, further wildcard patterns are combined with it
///   (so both must match), and a plain name replaces it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SuitePattern {
    pattern: String,
}

impl SuitePattern {
    /// Creates a new, empty suite pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `pattern` into the configured pattern, returning the result.
    ///
    /// Empty input leaves the configured pattern unchanged.
    pub fn configure(&mut self, pattern: &str) -> &str {
        if pattern.is_empty() {
            return &self.pattern;
        }

        if self.pattern.is_empty() {
            self.pattern = pattern.to_owned();
        } else if has_wildcards(&self.pattern) {
            if has_wildcards(pattern) {
                self.pattern.push(TOKEN_SEPARATOR);
                self.pattern.push_str(pattern);
            } else {
                self.pattern = pattern.to_owned();
            }
        }
        &self.pattern
    }

    /// Returns the configured pattern, or an empty string if none has been configured.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns the selection to use for a run requested with `requested`.
    ///
    /// An empty request falls back to the configured pattern.
    pub fn resolve(&self, requested: &str) -> Selection {
        if requested.is_empty() {
            Selection::new(self.pattern.clone())
        } else {
            Selection::new(requested)
        }
    }
}
