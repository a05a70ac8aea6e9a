//! Persistence for tag associations and the tag change log.
//!
//! The store keeps two logical tables, `tags` (realm, id, tag) and
//! `tags_change` (realm, id, time, author, old tags, new tags). Writers are
//! serialized through [`Transaction`]s; readers work on immutable snapshots
//! and never block on a writer.

mod backend;
mod error;
mod tag_store;
mod types;

pub use backend::{JsonFileBackend, MemoryBackend, StoreBackend};
pub use error::StoreError;
pub use tag_store::{TagStore, Transaction};
pub use types::{TagChangeRecord, TagDiff, TagRow, Tables};

#[cfg(test)]
#[path = "../store_tests.rs"]
mod store_tests;
