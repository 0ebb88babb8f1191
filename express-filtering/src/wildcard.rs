// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wildcard matching for unit names.
//!
//! The pattern alphabet is deliberately tiny:
//!
//! * `*` matches any run of characters, including an empty one.
//! * `?` matches exactly one character.
//! * `^X` matches exactly one character, as long as it isn't `X`.
//! * `!` at the very start of a pattern negates the rest of it.
//!
//! Every other character, including a `!` that isn't in leading position, matches itself.

/// The characters that make a pattern something other than a plain name.
pub const WILDCARD_CHARS: &[char] = &['?', '*', '^', '!'];

/// Returns true if `subject` matches the wildcard `pattern`.
///
/// An empty pattern only matches an empty subject, and a pattern consisting of a lone `!` never
/// matches anything.
pub fn matches(subject: &str, pattern: &str) -> bool {
    match pattern.strip_prefix('!') {
        Some("") => false,
        Some(rest) => !match_from(subject, rest),
        None => match_from(subject, pattern),
    }
}

/// Returns true if `pattern` contains any wildcard characters.
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(WILDCARD_CHARS)
}

fn match_from(subject: &str, pattern: &str) -> bool {
    let Some((p, rest)) = split_first(pattern) else {
        return subject.is_empty();
    };

    match p {
        '*' => {
            // Runs of stars are equivalent to a single star, and collapsing them keeps the
            // backtracking below from revisiting the same suffixes once per star.
            let rest = rest.trim_start_matches('*');
            if rest.is_empty() {
                return true;
            }

            let mut remaining = subject;
            loop {
                if match_from(remaining, rest) {
                    return true;
                }
                match split_first(remaining) {
                    Some((_, tail)) => remaining = tail,
                    None => return false,
                }
            }
        }
        '?' => split_first(subject).is_some_and(|(_, tail)| match_from(tail, rest)),
        '^' => {
            let Some((excluded, rest)) = split_first(rest) else {
                // A trailing caret has nothing to exclude.
                return false;
            };
            match split_first(subject) {
                Some((c, tail)) if c != excluded => match_from(tail, rest),
                _ => false,
            }
        }
        literal => match split_first(subject) {
            Some((c, tail)) if c == literal => match_from(tail, rest),
            _ => false,
        },
    }
}

fn split_first(s: &str) -> Option<(char, &str)> {
    let mut chars = s.chars();
    let first = chars.next()?;
    Some((first, chars.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;
    use test_strategy::proptest;

    #[test_case("", "", true ; "empty matches empty")]
    #[test_case("a", "", false ; "empty pattern rejects non-empty")]
    #[test_case("", "*", true ; "star matches empty")]
    #[test_case("anything", "*", true ; "star matches anything")]
    #[test_case("anything", "***", true ; "collapsed stars")]
    #[test_case("Beta1", "Beta*", true ; "prefix star")]
    #[test_case("Alpha", "Beta*", false ; "prefix star mismatch")]
    #[test_case("Beta1", "*1", true ; "suffix star")]
    #[test_case("Beta1", "B**a*1", true ; "interior stars")]
    #[test_case("Beta", "B*x*", false ; "interior star mismatch")]
    #[test_case("a", "?", true ; "question single")]
    #[test_case("", "?", false ; "question needs a char")]
    #[test_case("ab", "?", false ; "question exactly one")]
    #[test_case("ab", "^a?", false ; "caret excludes first char")]
    #[test_case("bb", "^ab", true ; "caret accepts other char")]
    #[test_case("b", "^a", true ; "caret alone")]
    #[test_case("", "^a", false ; "caret needs a char")]
    #[test_case("a", "^", false ; "trailing caret")]
    #[test_case("Alpha", "!Beta*", true ; "negated mismatch")]
    #[test_case("Beta2", "!Beta*", false ; "negated match")]
    #[test_case("anything", "!", false ; "bare bang")]
    #[test_case("", "!", false ; "bare bang empty")]
    #[test_case("a!b", "a!b", true ; "interior bang is literal")]
    #[test_case("ab", "a!b", false ; "interior bang does not negate")]
    #[test_case("Gamma", "Gamma", true ; "exact")]
    #[test_case("Gamma", "Gamm", false ; "exact prefix only")]
    #[test_case("état", "?tat", true ; "multibyte question")]
    #[test_case("été", "^e*", true ; "multibyte caret")]
    fn wildcard_cases(subject: &str, pattern: &str, expected: bool) {
        assert_eq!(
            matches(subject, pattern),
            expected,
            "matching {subject:?} against {pattern:?}"
        );
    }

    #[test]
    fn many_stars_terminate() {
        let subject = "a".repeat(64);
        let pattern = format!("{}b", "*".repeat(256));
        assert!(!matches(&subject, &pattern));
    }

    #[test]
    fn detects_wildcards() {
        assert!(has_wildcards("Beta*"));
        assert!(has_wildcards("!Alpha"));
        assert!(has_wildcards("^a"));
        assert!(has_wildcards("a?c"));
        assert!(!has_wildcards("Alpha"));
        assert!(!has_wildcards(""));
    }

    #[proptest]
    fn star_matches_everything(subject: String) {
        prop_assert!(matches(&subject, "*"));
    }

    #[proptest]
    fn question_matches_single_chars(subject: String) {
        prop_assert_eq!(matches(&subject, "?"), subject.chars().count() == 1);
    }

    #[proptest]
    fn negation_inverts(subject: String, #[strategy("[a-c?*^]{1,6}")] pattern: String) {
        prop_assert_eq!(
            matches(&subject, &format!("!{pattern}")),
            !matches(&subject, &pattern)
        );
    }

    #[proptest]
    fn plain_patterns_are_equality(
        #[strategy("[a-d]{0,5}")] subject: String,
        #[strategy("[a-d]{0,5}")] pattern: String,
    ) {
        prop_assert_eq!(matches(&subject, &pattern), subject == pattern);
    }

    #[proptest]
    fn names_match_themselves(#[strategy("[A-Za-z0-9_:]{0,16}")] subject: String) {
        prop_assert!(matches(&subject, &subject));
    }
}
