use crate::provider::RealmProvider;
use crate::tag::TagError;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Collects providers before the registry is frozen.
#[derive(Default)]
pub struct RealmRegistryBuilder {
    providers: Vec<Arc<dyn RealmProvider>>,
}

impl RealmRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::DuplicateRealm`] if its realm is already taken.
    pub fn register(mut self, provider: Arc<dyn RealmProvider>) -> Result<Self, TagError> {
        let realm = provider.taggable_realm();
        if self
            .providers
            .iter()
            .any(|existing| existing.taggable_realm() == realm)
        {
            return Err(TagError::DuplicateRealm(realm.to_owned()));
        }
        self.providers.push(provider);
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> RealmRegistry {
        RealmRegistry {
            providers: self.providers,
            by_realm: OnceLock::new(),
        }
    }
}

/// Immutable set of realm providers.
///
/// The realm index is built on first lookup and never changes afterwards;
/// adding a realm means building a new registry.
pub struct RealmRegistry {
    providers: Vec<Arc<dyn RealmProvider>>,
    by_realm: OnceLock<HashMap<String, Arc<dyn RealmProvider>>>,
}

impl RealmRegistry {
    #[must_use]
    pub fn builder() -> RealmRegistryBuilder {
        RealmRegistryBuilder::new()
    }

    fn index(&self) -> &HashMap<String, Arc<dyn RealmProvider>> {
        self.by_realm.get_or_init(|| {
            debug!("Indexing {} tag providers", self.providers.len());
            self.providers
                .iter()
                .map(|provider| (provider.taggable_realm().to_owned(), Arc::clone(provider)))
                .collect()
        })
    }

    /// The provider serving `realm`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidTagRealm`] if no provider serves it.
    pub fn provider(&self, realm: &str) -> Result<Arc<dyn RealmProvider>, TagError> {
        self.index()
            .get(realm)
            .map(Arc::clone)
            .ok_or_else(|| TagError::InvalidTagRealm(realm.to_owned()))
    }

    #[must_use]
    pub fn contains(&self, realm: &str) -> bool {
        self.index().contains_key(realm)
    }

    /// Providers in registration order.
    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn RealmProvider>] {
        &self.providers
    }

    #[must_use]
    pub fn realms(&self) -> BTreeSet<String> {
        self.index().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
