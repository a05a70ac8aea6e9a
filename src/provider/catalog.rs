//! Existence checks against the host's own resource model.

use std::collections::HashMap;

/// What the host knows about the resources of one realm.
pub trait ResourceCatalog: Send + Sync {
    fn exists(&self, id: &str) -> bool;

    fn describe(&self, _id: &str) -> Option<String> {
        None
    }
}

/// Treats every id as existing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCatalog;

impl ResourceCatalog for OpenCatalog {
    fn exists(&self, _id: &str) -> bool {
        true
    }
}

/// A fixed set of known resources with optional descriptions.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, Option<String>>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_resource<I: Into<String>>(mut self, id: I, description: Option<&str>) -> Self {
        self.entries
            .insert(id.into(), description.map(str::to_owned));
        self
    }
}

impl ResourceCatalog for StaticCatalog {
    fn exists(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn describe(&self, id: &str) -> Option<String> {
        self.entries.get(id).cloned().flatten()
    }
}
