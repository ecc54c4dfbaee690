//! The built-in brick catalog.
//!
//! A practical baseline of triggers, conditions, actions, and gates covering
//! the common automation patterns: comparing payload fields, setting
//! variables, logging, stopping or pausing a run, reshaping collections, and
//! calling webhooks. Everything here goes through the same
//! [`BrickRegistry`](crate::registry::BrickRegistry) contract as user
//! catalogs; nothing is special-cased in the engine.

pub mod actions;
pub mod conditions;
pub mod gates;
pub mod triggers;

use crate::registry::BrickRegistry;

/// Register the full built-in catalog into a registry.
pub fn register_all(registry: &mut BrickRegistry) {
    triggers::register(registry);
    conditions::register(registry);
    actions::register(registry);
    gates::register(registry);
}
