//! Store-backed provider used by most realms.

use super::{ProviderOptions, RealmProvider, ResourceCatalog, TaggedStream};
use crate::permission::{PermissionPolicy, Requester, TagAction};
use crate::store::{StoreError, TagChangeRecord, TagRow, TagStore};
use crate::tag::{
    normalize_tags, Resource, ResourceFilter, TagCounter, TagError, TagSet, TaggedResource,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt as _};
use std::sync::Arc;
use tracing::{debug, warn};

/// Keeps the tags of one realm in a shared [`TagStore`].
pub struct DefaultTagProvider {
    realm: String,
    store: Arc<TagStore>,
    policy: Arc<dyn PermissionPolicy>,
    catalog: Arc<dyn ResourceCatalog>,
    options: ProviderOptions,
}

impl DefaultTagProvider {
    #[must_use]
    pub fn new<S: Into<String>>(
        realm: S,
        store: Arc<TagStore>,
        policy: Arc<dyn PermissionPolicy>,
        catalog: Arc<dyn ResourceCatalog>,
        options: ProviderOptions,
    ) -> Self {
        Self {
            realm: realm.into(),
            store,
            policy,
            catalog,
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Realm-level checks stand in for per-resource ones only when enabled
    /// and the policy has nothing finer to say.
    #[must_use]
    pub fn uses_fast_permission_check(&self) -> bool {
        self.options.fast_permission_check && self.policy.is_default()
    }

    fn permitted(&self, requester: &Requester, resource: &Resource, action: TagAction) -> bool {
        if self.uses_fast_permission_check() {
            self.policy.authorized(
                &requester.username,
                &Resource::realm_level(self.realm.as_str()),
                action,
            )
        } else {
            self.policy.authorized(&requester.username, resource, action)
        }
    }

    fn require(
        &self,
        requester: &Requester,
        resource: &Resource,
        action: TagAction,
    ) -> Result<(), TagError> {
        if self.permitted(requester, resource, action) {
            Ok(())
        } else {
            debug!(
                "Denied {} on tags of {} for {}",
                action, resource, requester.username
            );
            Err(TagError::PermissionDenied {
                action,
                resource: resource.clone(),
                username: requester.username.clone(),
            })
        }
    }

    fn ensure_realm(&self, resource: &Resource) -> Result<(), TagError> {
        if resource.realm == self.realm {
            Ok(())
        } else {
            Err(TagError::InvalidTagRealm(resource.realm.clone()))
        }
    }

    fn ensure_exists(&self, resource: &Resource) -> Result<(), TagError> {
        if self.catalog.exists(&resource.id) {
            Ok(())
        } else {
            Err(TagError::ResourceNotFound(resource.clone()))
        }
    }

    /// Seed associations in bulk, e.g. when first mirroring an existing
    /// field into the store.
    ///
    /// Returns how many rows were inserted. Existing associations abort the
    /// whole batch: it is rolled back, a warning is logged and `Ok(0)` is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Store`] for storage failures other than
    /// integrity violations, and [`TagError::InvalidTagRealm`] for
    /// resources of another realm.
    pub async fn synchronize(&self, entries: &[(Resource, TagSet)]) -> Result<usize, TagError> {
        let mut rows = Vec::new();
        for (resource, tags) in entries {
            self.ensure_realm(resource)?;
            for tag in normalize_tags(tags)? {
                rows.push(TagRow::new(resource, tag));
            }
        }
        match self.store.insert_associations(rows).await {
            Ok(inserted) => {
                debug!("Synchronized {} tags into realm {}", inserted, self.realm);
                Ok(inserted)
            }
            Err(StoreError::Integrity(reason)) => {
                warn!(
                    "Tags of realm {} already present, skipping synchronization: {}",
                    self.realm, reason
                );
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl RealmProvider for DefaultTagProvider {
    fn taggable_realm(&self) -> &str {
        &self.realm
    }

    fn can_view_realm(&self, requester: &Requester) -> bool {
        self.policy.authorized(
            &requester.username,
            &Resource::realm_level(self.realm.as_str()),
            TagAction::View,
        )
    }

    async fn tagged_resources(
        &self,
        requester: &Requester,
        tags: Option<&TagSet>,
        filter: Option<&ResourceFilter>,
    ) -> Result<TaggedStream, TagError> {
        if !self.can_view_realm(requester) {
            return Ok(stream::empty().boxed());
        }
        let effective = self.options.filter.merged(filter);
        let candidates = self
            .store
            .tagged_resources(&self.realm, tags, &effective)
            .await;

        let realm = self.realm.clone();
        let policy = Arc::clone(&self.policy);
        let username = requester.username.clone();
        let per_resource = !self.uses_fast_permission_check();
        Ok(stream::iter(candidates)
            .filter_map(move |(id, resource_tags)| {
                let resource = Resource::new(realm.as_str(), id);
                let visible = !per_resource
                    || policy.authorized(&username, &resource, TagAction::View);
                let item = visible.then(|| {
                    Ok(TaggedResource {
                        resource,
                        tags: resource_tags,
                    })
                });
                futures::future::ready(item)
            })
            .boxed())
    }

    async fn all_tags(
        &self,
        requester: &Requester,
        filter: Option<&ResourceFilter>,
    ) -> Result<TagCounter, TagError> {
        if !self.can_view_realm(requester) {
            return Ok(TagCounter::new());
        }
        let effective = self.options.filter.merged(filter);
        if self.uses_fast_permission_check() {
            return Ok(self
                .store
                .frequency(&self.realm, &effective)
                .await
                .into_iter()
                .collect());
        }
        let mut counter = TagCounter::new();
        for (id, tags) in self.store.tagged_resources(&self.realm, None, &effective).await {
            let resource = Resource::new(self.realm.as_str(), id);
            if self
                .policy
                .authorized(&requester.username, &resource, TagAction::View)
            {
                for tag in tags {
                    counter.add(tag, 1);
                }
            }
        }
        Ok(counter)
    }

    async fn resource_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
    ) -> Result<TagSet, TagError> {
        self.ensure_realm(resource)?;
        self.require(requester, resource, TagAction::View)?;
        self.ensure_exists(resource)?;
        Ok(self.store.resource_tags(resource).await)
    }

    async fn set_resource_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        tags: &TagSet,
        comment: &str,
    ) -> Result<(), TagError> {
        self.ensure_realm(resource)?;
        self.require(requester, resource, TagAction::Modify)?;
        self.ensure_exists(resource)?;
        let normalized = normalize_tags(tags)?;
        let diff = self
            .store
            .diff_and_apply(
                resource,
                &normalized,
                &requester.username,
                self.options.revisable,
                None,
            )
            .await?;
        if !diff.is_empty() && !comment.is_empty() {
            debug!("Tag change on {} commented: {}", resource, comment);
        }
        Ok(())
    }

    async fn reparent_resource_tags(
        &self,
        requester: &Requester,
        old: &Resource,
        new: &Resource,
        comment: &str,
    ) -> Result<(), TagError> {
        self.ensure_realm(old)?;
        if new.realm != old.realm {
            return Err(TagError::CrossRealmMove {
                from: old.realm.clone(),
                to: new.realm.clone(),
            });
        }
        self.require(requester, old, TagAction::Modify)?;
        self.require(requester, new, TagAction::Modify)?;
        self.ensure_exists(new)?;
        self.store.reparent(old, &new.id).await?;
        if !comment.is_empty() {
            debug!("Reparent of {} to {} commented: {}", old, new, comment);
        }
        Ok(())
    }

    async fn remove_resource_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        comment: &str,
    ) -> Result<(), TagError> {
        self.ensure_realm(resource)?;
        self.require(requester, resource, TagAction::Modify)?;
        self.ensure_exists(resource)?;
        let diff = self
            .store
            .clear(resource, &requester.username, self.options.revisable)
            .await?;
        if !diff.is_empty() && !comment.is_empty() {
            debug!("Tag removal on {} commented: {}", resource, comment);
        }
        Ok(())
    }

    async fn purge_resource_tags(&self, resource: &Resource) -> Result<(), TagError> {
        self.ensure_realm(resource)?;
        self.store.purge(resource).await?;
        Ok(())
    }

    async fn historical_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        at: DateTime<Utc>,
    ) -> Result<TagSet, TagError> {
        self.ensure_realm(resource)?;
        self.require(requester, resource, TagAction::View)?;
        Ok(self.store.historical_tags(resource, at).await)
    }

    async fn tag_changes(
        &self,
        requester: &Requester,
        resource: &Resource,
    ) -> Result<Vec<TagChangeRecord>, TagError> {
        self.ensure_realm(resource)?;
        self.require(requester, resource, TagAction::View)?;
        Ok(self.store.tag_changes(resource).await)
    }

    async fn describe_tagged_resource(
        &self,
        requester: &Requester,
        resource: &Resource,
    ) -> String {
        if resource.realm != self.realm
            || !self.permitted(requester, resource, TagAction::View)
        {
            return String::new();
        }
        self.catalog.describe(&resource.id).unwrap_or_default()
    }
}
