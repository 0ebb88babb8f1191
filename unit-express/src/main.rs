// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs unit-express's self-checks.

use color_eyre::Result;
use express_filtering::wildcard;
use unit_express::{Unit, UnitError, unit_assert};

struct StringComparisons {
    time: String,
}

impl Unit for StringComparisons {
    fn setup() -> Result<Self, UnitError> {
        Ok(Self {
            time: "11:35".to_owned(),
        })
    }

    fn test(&mut self) -> Result<(), UnitError> {
        unit_assert!(String::new().is_empty(), "empty string");
        unit_assert!(self.time == "11:35", "{} == 11:35", self.time);
        unit_assert!(self.time.as_str() < "12:00", "{} < 12:00", self.time);
        unit_assert!(self.time.as_str() > "11:00", "{} > 11:00", self.time);
        unit_assert!("11:21" > "11:20", "11:21 > 11:20");
        unit_assert!("11:21" <= "11:21", "11:21 <= 11:21");
        Ok(())
    }
}

struct NumericComparisons {
    float: f64,
    signed: i32,
    unsigned: u32,
}

impl Unit for NumericComparisons {
    fn setup() -> Result<Self, UnitError> {
        Ok(Self {
            float: 1.0,
            signed: 1,
            unsigned: 1,
        })
    }

    fn test(&mut self) -> Result<(), UnitError> {
        unit_assert!(
            self.float == f64::from(self.signed),
            "{} == {}",
            self.float,
            self.signed
        );
        unit_assert!(
            self.float == f64::from(self.unsigned),
            "{} == {}",
            self.float,
            self.unsigned
        );
        unit_assert!(i64::from(self.signed) == i64::from(self.unsigned));
        Ok(())
    }
}

fn wildcard_matching() -> Result<(), UnitError> {
    unit_assert!(wildcard::matches("Beta1", "Beta*"), "Beta* matches Beta1");
    unit_assert!(wildcard::matches("Beta1", "Bet??"), "Bet?? matches Beta1");
    unit_assert!(!wildcard::matches("Alpha", "^A*"), "^A* rejects Alpha");
    unit_assert!(wildcard::matches("Gamma", "!Beta*"), "!Beta* accepts Gamma");
    unit_assert!(!wildcard::matches("ab", "^a?"), "^a? rejects ab");
    Ok(())
}

fn main() -> Result<()> {
    unit_express::main_with(|harness| {
        harness.register_unit::<StringComparisons>();
        harness.register_unit::<NumericComparisons>();
        harness.register_fn("WildcardMatching", wildcard_matching);
    })
}
