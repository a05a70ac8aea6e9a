//! Common test utilities

use std::path::Path;
use std::sync::Arc;
use tagspace::{
    split_into_tags, AllowAll, DefaultTagProvider, JsonFileBackend, OpenCatalog,
    PermissionPolicy, ProviderOptions, RealmRegistry, Requester, Resource, TagSet, TagStore,
    TagSystem, TagsConfig,
};
use tempfile::TempDir;

/// Create a temporary directory for testing
#[allow(dead_code)] // Test utility for integration tests
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Parse a whitespace/comma separated tag list
#[allow(dead_code)]
pub fn tags(text: &str) -> TagSet {
    split_into_tags(text)
}

#[allow(dead_code)]
pub fn alice() -> Requester {
    Requester::new("alice")
}

/// A tag system over `store` with `wiki` and `ticket` realms.
#[allow(dead_code)]
pub fn build_system(
    store: &Arc<TagStore>,
    policy: Arc<dyn PermissionPolicy>,
    config: &TagsConfig,
) -> TagSystem {
    let mut builder = RealmRegistry::builder();
    for realm in ["wiki", "ticket"] {
        let provider = DefaultTagProvider::new(
            realm,
            Arc::clone(store),
            Arc::clone(&policy),
            Arc::new(OpenCatalog),
            ProviderOptions::for_realm(config, realm),
        );
        builder = builder
            .register(Arc::new(provider))
            .expect("realms are distinct");
    }
    TagSystem::new(builder.build())
}

/// In-memory store plus a permissive tag system with default config
#[allow(dead_code)]
pub fn memory_system() -> (Arc<TagStore>, TagSystem) {
    let store = Arc::new(TagStore::in_memory());
    let system = build_system(&store, Arc::new(AllowAll), &TagsConfig::default());
    (store, system)
}

/// Tag system persisting to `path`
#[allow(dead_code)]
pub async fn file_system(path: &Path) -> (Arc<TagStore>, TagSystem) {
    let store = Arc::new(
        TagStore::open(Arc::new(JsonFileBackend::new(path)))
            .await
            .expect("Failed to open tag store"),
    );
    let system = build_system(&store, Arc::new(AllowAll), &TagsConfig::default());
    (store, system)
}

/// Tag every resource as given, failing the test on error
#[allow(dead_code)]
pub async fn seed(system: &TagSystem, entries: &[(&str, &str, &str)]) {
    for (realm, id, text) in entries {
        system
            .set_tags(&alice(), &Resource::new(*realm, *id), &tags(text), "seed")
            .await
            .expect("Failed to seed tags");
    }
}

/// Sorted `realm:id` strings of query hits
#[allow(dead_code)]
pub async fn query_ids(system: &TagSystem, requester: &Requester, query: &str) -> Vec<String> {
    let mut ids: Vec<String> = system
        .query_all(requester, query, None)
        .await
        .expect("query should succeed")
        .into_iter()
        .map(|hit| hit.resource.to_string())
        .collect();
    ids.sort();
    ids
}
