use super::scan_realms;
use crate::permission::Requester;
use crate::provider::{RealmProvider, TaggedStream};
use crate::query::{AttributeHandlers, Query};
use crate::registry::RealmRegistry;
use crate::store::TagChangeRecord;
use crate::tag::{Resource, TagCounter, TagError, TagSet, TaggedResource};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt as _, TryStreamExt as _};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of [`TagSystem::replace_tag`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Resources whose tag set was rewritten.
    pub updated: usize,
    /// Resources left without any tag.
    pub cleared: usize,
}

/// Entry point for tag queries and mutations across every realm.
pub struct TagSystem {
    registry: RealmRegistry,
}

async fn realm_candidates(
    provider: Arc<dyn RealmProvider>,
    requester: Requester,
    prefetch: Option<TagSet>,
) -> Result<TaggedStream, TagError> {
    debug!(
        "Querying realm {} with prefetch {:?}",
        provider.taggable_realm(),
        prefetch
    );
    provider
        .tagged_resources(&requester, prefetch.as_ref(), None)
        .await
}

impl TagSystem {
    #[must_use]
    pub fn new(registry: RealmRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &RealmRegistry {
        &self.registry
    }

    /// # Errors
    ///
    /// Returns [`TagError::InvalidTagRealm`] if no provider serves `realm`.
    pub fn provider(&self, realm: &str) -> Result<Arc<dyn RealmProvider>, TagError> {
        self.registry.provider(realm)
    }

    fn providers_in(&self, realms: Option<&[String]>) -> Vec<Arc<dyn RealmProvider>> {
        self.registry
            .providers()
            .iter()
            .filter(|provider| {
                realms.map_or(true, |wanted| {
                    wanted.iter().any(|r| r == provider.taggable_realm())
                })
            })
            .map(Arc::clone)
            .collect()
    }

    /// Stream every resource matching `text` that `requester` may view.
    ///
    /// Parsing and realm resolution happen up front; candidates are fetched
    /// realm by realm as the stream is polled, narrowed by the tags every
    /// match must carry, then checked against the full expression.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidQuery`] for malformed queries and
    /// [`TagError::InvalidTagRealm`] when `realm:` names an unknown realm.
    pub fn query(
        &self,
        requester: &Requester,
        text: &str,
        extra_handlers: Option<&AttributeHandlers>,
    ) -> Result<TaggedStream, TagError> {
        let mut handlers = AttributeHandlers::with_defaults();
        if let Some(extra) = extra_handlers {
            handlers.extend(extra);
        }
        let query = Query::parse(text, handlers)?;

        let named = scan_realms(query.as_string());
        let providers = if named.is_empty() {
            self.providers_in(None)
        } else {
            named
                .iter()
                .map(|realm| self.registry.provider(realm))
                .collect::<Result<Vec<_>, _>>()?
        };

        let prefetch = query.prefetch_tags();
        debug!(
            "Query '{}' over {} realms",
            query.as_string(),
            providers.len()
        );
        let who = requester.clone();
        Ok(stream::iter(providers)
            .then(move |provider| realm_candidates(provider, who.clone(), prefetch.clone()))
            .try_flatten()
            .try_filter_map(move |candidate| {
                let verdict = query
                    .matches(&candidate.tags, &candidate.resource)
                    .map(|hit| hit.then_some(candidate));
                futures::future::ready(verdict)
            })
            .boxed())
    }

    /// [`TagSystem::query`], collected.
    ///
    /// # Errors
    ///
    /// Returns the first error of the query or of any realm.
    pub async fn query_all(
        &self,
        requester: &Requester,
        text: &str,
        extra_handlers: Option<&AttributeHandlers>,
    ) -> Result<Vec<TaggedResource>, TagError> {
        self.query(requester, text, extra_handlers)?
            .try_collect()
            .await
    }

    /// Tag frequencies merged over `realms`, or over every realm.
    /// Realms without a provider are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first provider error.
    pub async fn get_all_tags(
        &self,
        requester: &Requester,
        realms: Option<&[String]>,
    ) -> Result<TagCounter, TagError> {
        let mut merged = TagCounter::new();
        for provider in self.providers_in(realms) {
            merged += provider.all_tags(requester, None).await?;
        }
        Ok(merged)
    }

    /// # Errors
    ///
    /// Returns [`TagError`] for unknown realms, denied views and missing
    /// resources.
    pub async fn get_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
    ) -> Result<TagSet, TagError> {
        self.provider(&resource.realm)?
            .resource_tags(requester, resource)
            .await
    }

    /// Replace the tags of `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] for unknown realms, denied changes, missing
    /// resources, empty tags and storage failures.
    pub async fn set_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        tags: &TagSet,
        comment: &str,
    ) -> Result<(), TagError> {
        self.provider(&resource.realm)?
            .set_resource_tags(requester, resource, tags, comment)
            .await
    }

    /// Add `tags` to those `resource` already has.
    ///
    /// # Errors
    ///
    /// See [`TagSystem::set_tags`].
    pub async fn add_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        tags: &TagSet,
        comment: &str,
    ) -> Result<(), TagError> {
        let provider = self.provider(&resource.realm)?;
        let mut combined = provider.resource_tags(requester, resource).await?;
        combined.extend(tags.iter().cloned());
        provider
            .set_resource_tags(requester, resource, &combined, comment)
            .await
    }

    /// Remove `tags` from `resource`, or every tag when `tags` is `None`.
    ///
    /// # Errors
    ///
    /// See [`TagSystem::set_tags`].
    pub async fn delete_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        tags: Option<&TagSet>,
        comment: &str,
    ) -> Result<(), TagError> {
        let provider = self.provider(&resource.realm)?;
        match tags {
            None => {
                provider
                    .remove_resource_tags(requester, resource, comment)
                    .await
            }
            Some(unwanted) => {
                let current = provider.resource_tags(requester, resource).await?;
                let remaining: TagSet = current.difference(unwanted).cloned().collect();
                provider
                    .set_resource_tags(requester, resource, &remaining, comment)
                    .await
            }
        }
    }

    /// Rename `old_tags` to `new_tag` (or drop them) on every resource
    /// holding any of them.
    ///
    /// A resource whose tags are all in `old_tags` loses every tag only when
    /// `allow_delete` is set and no `new_tag` is given. Otherwise the
    /// remaining tags plus `new_tag` are written, but only when that changes
    /// something and either `allow_delete` or `new_tag` is set.
    ///
    /// # Errors
    ///
    /// Returns the first provider error; resources updated before it keep
    /// their new tags.
    pub async fn replace_tag(
        &self,
        requester: &Requester,
        old_tags: &TagSet,
        new_tag: Option<&str>,
        comment: &str,
        allow_delete: bool,
        realms: Option<&[String]>,
    ) -> Result<ReplaceSummary, TagError> {
        let mut summary = ReplaceSummary::default();
        for provider in self.providers_in(realms) {
            let holders: Vec<TaggedResource> = provider
                .tagged_resources(requester, Some(old_tags), None)
                .await?
                .try_collect()
                .await?;
            for TaggedResource { resource, tags } in holders {
                if new_tag.is_none() && tags.is_subset(old_tags) {
                    if allow_delete {
                        provider
                            .remove_resource_tags(requester, &resource, comment)
                            .await?;
                        summary.cleared = summary.cleared.saturating_add(1);
                    }
                    continue;
                }
                let mut effective: TagSet = tags.difference(old_tags).cloned().collect();
                if let Some(tag) = new_tag {
                    effective.insert(tag.to_owned());
                }
                if effective != tags && (allow_delete || new_tag.is_some()) {
                    provider
                        .set_resource_tags(requester, &resource, &effective, comment)
                        .await?;
                    summary.updated = summary.updated.saturating_add(1);
                }
            }
        }
        info!(
            "Replaced tags {:?} with {:?}: {} updated, {} cleared",
            old_tags, new_tag, summary.updated, summary.cleared
        );
        Ok(summary)
    }

    /// Carry tags and history over a resource rename within one realm.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::CrossRealmMove`] when the realms differ, and
    /// provider errors otherwise.
    pub async fn reparent_tags(
        &self,
        requester: &Requester,
        old: &Resource,
        new: &Resource,
        comment: &str,
    ) -> Result<(), TagError> {
        if old.realm != new.realm {
            return Err(TagError::CrossRealmMove {
                from: old.realm.clone(),
                to: new.realm.clone(),
            });
        }
        self.provider(&old.realm)?
            .reparent_resource_tags(requester, old, new, comment)
            .await
    }

    /// # Errors
    ///
    /// Returns [`TagError::InvalidTagRealm`] for unknown realms.
    pub async fn describe_tagged_resource(
        &self,
        requester: &Requester,
        resource: &Resource,
    ) -> Result<String, TagError> {
        Ok(self
            .provider(&resource.realm)?
            .describe_tagged_resource(requester, resource)
            .await)
    }

    /// Registered realms, limited to those `requester` may view when given.
    #[must_use]
    pub fn taggable_realms(&self, requester: Option<&Requester>) -> BTreeSet<String> {
        self.registry
            .providers()
            .iter()
            .filter(|provider| requester.map_or(true, |who| provider.can_view_realm(who)))
            .map(|provider| provider.taggable_realm().to_owned())
            .collect()
    }

    /// Tags of `resource` as of `at`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] for unknown realms and denied views.
    pub async fn tags_at(
        &self,
        requester: &Requester,
        resource: &Resource,
        at: DateTime<Utc>,
    ) -> Result<TagSet, TagError> {
        self.provider(&resource.realm)?
            .historical_tags(requester, resource, at)
            .await
    }

    /// Change log of `resource`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] for unknown realms and denied views.
    pub async fn tag_changes(
        &self,
        requester: &Requester,
        resource: &Resource,
    ) -> Result<Vec<TagChangeRecord>, TagError> {
        self.provider(&resource.realm)?
            .tag_changes(requester, resource)
            .await
    }

    /// Forget everything about a resource the host has deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] for unknown realms and storage failures.
    pub async fn resource_destroyed(&self, resource: &Resource) -> Result<(), TagError> {
        self.provider(&resource.realm)?
            .purge_resource_tags(resource)
            .await
    }
}
