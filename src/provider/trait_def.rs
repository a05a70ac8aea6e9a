use crate::permission::Requester;
use crate::store::TagChangeRecord;
use crate::tag::{Resource, ResourceFilter, TagCounter, TagError, TagSet, TaggedResource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

/// Lazily produced query candidates.
pub type TaggedStream = BoxStream<'static, Result<TaggedResource, TagError>>;

/// Tag storage and permission checks for one realm.
///
/// Reads are gated on `View`, mutations on `Modify`. A denied mutation
/// fails with [`TagError::PermissionDenied`] before anything is written.
#[async_trait]
pub trait RealmProvider: Send + Sync {
    /// The realm this provider serves.
    fn taggable_realm(&self) -> &str;

    /// Whether `requester` may see tags of this realm at all.
    fn can_view_realm(&self, requester: &Requester) -> bool;

    /// Resources carrying any of `tags` (all tagged resources when `None`)
    /// that `requester` may view, each with its full tag set.
    async fn tagged_resources(
        &self,
        requester: &Requester,
        tags: Option<&TagSet>,
        filter: Option<&ResourceFilter>,
    ) -> Result<TaggedStream, TagError>;

    /// Tag frequencies across the visible resources of the realm.
    async fn all_tags(
        &self,
        requester: &Requester,
        filter: Option<&ResourceFilter>,
    ) -> Result<TagCounter, TagError>;

    async fn resource_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
    ) -> Result<TagSet, TagError>;

    /// Replace the tag set of `resource` with `tags`.
    async fn set_resource_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        tags: &TagSet,
        comment: &str,
    ) -> Result<(), TagError>;

    /// Move tags and history from `old` to `new` after a rename.
    async fn reparent_resource_tags(
        &self,
        requester: &Requester,
        old: &Resource,
        new: &Resource,
        comment: &str,
    ) -> Result<(), TagError>;

    /// Remove every tag of a resource that still exists.
    async fn remove_resource_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        comment: &str,
    ) -> Result<(), TagError>;

    /// Forget a resource that no longer exists, history included.
    async fn purge_resource_tags(&self, resource: &Resource) -> Result<(), TagError>;

    /// Tags of `resource` as recorded at `at`.
    async fn historical_tags(
        &self,
        requester: &Requester,
        resource: &Resource,
        at: DateTime<Utc>,
    ) -> Result<TagSet, TagError>;

    /// Change log of `resource`, newest first.
    async fn tag_changes(
        &self,
        requester: &Requester,
        resource: &Resource,
    ) -> Result<Vec<TagChangeRecord>, TagError>;

    /// Human-readable description, empty when unknown or not viewable.
    async fn describe_tagged_resource(&self, requester: &Requester, resource: &Resource)
        -> String;
}
