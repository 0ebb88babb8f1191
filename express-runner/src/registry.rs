// Copyright (c) The unit-express Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The registry of known units.
//!
//! Units are registered explicitly, usually from a single startup routine in the host program, and
//! iterated in name order so reports are reproducible.

use crate::{
    errors::UnitError,
    runner::{RunContext, Unit, UnitResult, execute, execute_unit},
};
use std::{collections::BTreeMap, fmt, sync::Arc};

/// The callable that runs a registered unit.
pub type UnitRunner = Arc<dyn Fn(&RunContext<'_>) -> UnitResult + Send + Sync>;

/// A registered unit: a name and the runner that executes it.
#[derive(Clone)]
pub struct UnitDescriptor {
    name: String,
    runner: UnitRunner,
}

impl UnitDescriptor {
    /// Returns the name of the unit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executes the unit with the given context.
    pub fn run(&self, cx: &RunContext<'_>) -> UnitResult {
        (self.runner)(cx)
    }
}

impl fmt::Debug for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitDescriptor")
            .field("name", &self.name)
            .field("runner", &"Fn(..) { .. }")
            .finish()
    }
}

/// Where a unit asks to be placed in the default selection.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum UnitMarker {
    /// No preference.
    #[default]
    None,

    /// Run only this unit by default.
    Only,

    /// Skip this unit by default.
    Skip,
}

impl UnitMarker {
    /// Returns the suite pattern that this marker configures for a unit named `name`, if any.
    pub fn suite_pattern(self, name: &str) -> Option<String> {
        match self {
            Self::None => None,
            Self::Only => Some(name.to_owned()),
            Self::Skip => Some(format!("!{name}")),
        }
    }
}

/// A mapping from unit names to runnable descriptors.
///
/// Registering a name that already exists replaces the earlier descriptor.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    units: BTreeMap<String, UnitDescriptor>,
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `runner` under `name`, returning true if an earlier descriptor was replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, runner: F) -> bool
    where
        F: Fn(&RunContext<'_>) -> UnitResult + Send + Sync + 'static,
    {
        let name = name.into();
        let descriptor = UnitDescriptor {
            name: name.clone(),
            runner: Arc::new(runner),
        };
        self.units.insert(name, descriptor).is_some()
    }

    /// Registers the unit type `T` under its type name, returning that name.
    ///
    /// The name is the last path segment of the type, so `my_crate::tests::Alpha` registers as
    /// `Alpha`.
    pub fn register_unit<T: Unit + 'static>(&mut self) -> String {
        let name = unit_name::<T>().to_owned();
        self.register_unit_as::<T>(name.clone());
        name
    }

    /// Registers the unit type `T` under an explicit name.
    pub fn register_unit_as<T: Unit + 'static>(&mut self, name: impl Into<String>) -> bool {
        self.register(name, |cx| execute_unit::<T>(cx.name()))
    }

    /// Registers a unit that consists of just a test body, with no setup or teardown.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, body: F) -> bool
    where
        F: Fn() -> Result<(), UnitError> + Send + Sync + 'static,
    {
        self.register(name, move |cx| {
            execute(cx.name(), || Ok(()), |_| body(), |()| Ok(()))
        })
    }

    /// Returns the descriptor registered under `name`.
    pub fn get(&self, name: &str) -> Option<&UnitDescriptor> {
        self.units.get(name)
    }

    /// Iterates over all descriptors in name order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &UnitDescriptor> + '_ {
        self.units.values()
    }

    /// Iterates over all registered names in order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.units.keys().map(String::as_str)
    }

    /// Returns the number of registered units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no units are registered.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Returns the name a unit type registers under by default.
pub fn unit_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Generic arguments can contain paths of their own, so strip them before looking for the last
    // path segment.
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
