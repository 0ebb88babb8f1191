// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The assertion primitive used inside units.

/// Fails the enclosing unit stage if a condition is false.
///
/// On failure this returns `Err(UnitError::Failure(..))` from the enclosing function, which must
/// return `Result<_, UnitError>`. The message is built with [`format!`] from the remaining
/// arguments, and is empty if none are given. Nothing is formatted if the condition holds.
///
/// # Examples
///
/// ```
/// use express_runner::{errors::UnitError, unit_assert};
///
/// fn check(x: i32) -> Result<(), UnitError> {
///     unit_assert!(x < 5, "x={}", x);
///     Ok(())
/// }
///
/// assert!(check(3).is_ok());
/// assert_eq!(check(5).unwrap_err().message(), "x=5");
/// ```
#[macro_export]
macro_rules! unit_assert {
    ($cond:expr $(,)?) => {
        if !$cond {
            return ::std::result::Result::Err($crate::errors::UnitError::failure(
                ::std::string::String::new(),
            ));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return ::std::result::Result::Err($crate::errors::UnitError::failure(
                ::std::format!($($arg)+),
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::errors::UnitError;

    fn in_range(value: u32) -> Result<u32, UnitError> {
        unit_assert!(value < 10, "value {} is out of range", value);
        Ok(value)
    }

    #[test]
    fn passes_through_on_success() {
        assert_eq!(in_range(3).expect("3 is in range"), 3);
    }

    #[test]
    fn formats_on_failure() {
        let err = in_range(12).expect_err("12 is out of range");
        assert!(matches!(err, UnitError::Failure(_)), "{err:?}");
        assert_eq!(err.message(), "value 12 is out of range");
    }

    #[test]
    fn inline_format_args() {
        fn check(name: &str) -> Result<(), UnitError> {
            unit_assert!(name.is_empty(), "unexpected name {name}");
            Ok(())
        }
        assert_eq!(
            check("Beta").expect_err("non-empty").message(),
            "unexpected name Beta"
        );
    }
}
