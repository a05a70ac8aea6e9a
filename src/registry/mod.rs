//! Realm to provider lookup.

mod realms;

pub use realms::{RealmRegistry, RealmRegistryBuilder};

#[cfg(test)]
#[path = "../registry_tests.rs"]
mod registry_tests;
