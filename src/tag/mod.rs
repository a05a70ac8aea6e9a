//! Core tagging vocabulary.
//!
//! Resources, tag sets, the frequency counter and the crate-wide
//! [`TagError`] live here so that the store, the query engine and the
//! realm providers all speak the same types.

mod counter;
mod error;
mod types;

pub use counter::TagCounter;
pub use error::TagError;
pub use types::{
    join_tags, normalize_tags, split_into_tags, Resource, ResourceFilter, TagSet, TaggedResource,
};

#[cfg(test)]
#[path = "../tag_tests.rs"]
mod tag_tests;
