//! Realm providers: the per-realm half of the tagging API.
//!
//! Every realm that can carry tags (wiki pages, tickets, ...) is served by
//! one [`RealmProvider`]. Most realms use [`DefaultTagProvider`], which
//! keeps tags in the shared [`TagStore`](crate::store::TagStore).

mod catalog;
mod default;
mod options;
mod trait_def;

pub use catalog::{OpenCatalog, ResourceCatalog, StaticCatalog};
pub use default::DefaultTagProvider;
pub use options::ProviderOptions;
pub use trait_def::{RealmProvider, TaggedStream};

#[cfg(test)]
#[path = "../provider_tests.rs"]
mod provider_tests;
