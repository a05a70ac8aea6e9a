//! Tagging for realm-partitioned resources.
//!
//! Resources such as wiki pages or tickets carry free-form tags. A
//! [`TagSystem`] answers boolean tag queries across realms and routes
//! mutations to the [`RealmProvider`] serving each realm, which checks
//! permissions and records changes in a transactional [`TagStore`].
// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

pub mod config;
pub mod logging;
pub mod permission;
pub mod provider;
pub mod query;
pub mod registry;
pub mod store;
pub mod system;
pub mod tag;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, ConfigError, RealmConfig, TagsConfig};
pub use permission::{AllowAll, GrantTable, PermissionPolicy, Requester, TagAction};
pub use provider::{
    DefaultTagProvider, OpenCatalog, ProviderOptions, RealmProvider, ResourceCatalog,
    StaticCatalog, TaggedStream,
};
pub use query::{AttributeHandler, AttributeHandlers, Query, QueryNode};
pub use registry::{RealmRegistry, RealmRegistryBuilder};
pub use store::{
    JsonFileBackend, MemoryBackend, StoreBackend, StoreError, TagChangeRecord, TagRow, TagStore,
};
pub use system::{ReplaceSummary, TagSystem};
pub use tag::{
    split_into_tags, Resource, ResourceFilter, TagCounter, TagError, TagSet, TaggedResource,
};
