//! Row types and the in-memory table image.

use crate::tag::{join_tags, Resource, ResourceFilter, TagSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One resource/tag association.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagRow {
    #[serde(rename = "tagspace")]
    pub realm: String,
    #[serde(rename = "name")]
    pub id: String,
    pub tag: String,
}

impl TagRow {
    #[must_use]
    pub fn new<S: Into<String>>(resource: &Resource, tag: S) -> Self {
        Self {
            realm: resource.realm.clone(),
            id: resource.id.clone(),
            tag: tag.into(),
        }
    }

    fn lower_bound(realm: &str, id: &str) -> Self {
        Self {
            realm: realm.to_owned(),
            id: id.to_owned(),
            tag: String::new(),
        }
    }
}

/// One entry of the tag change log.
///
/// `time` is microseconds since the Unix epoch. Tag lists are stored
/// sorted and space-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagChangeRecord {
    #[serde(rename = "tagspace")]
    pub realm: String,
    #[serde(rename = "name")]
    pub id: String,
    pub time: i64,
    pub author: String,
    #[serde(rename = "oldtags")]
    pub old_tags: String,
    #[serde(rename = "newtags")]
    pub new_tags: String,
}

impl TagChangeRecord {
    #[must_use]
    pub fn new(resource: &Resource, time: i64, author: &str, old: &TagSet, new: &TagSet) -> Self {
        Self {
            realm: resource.realm.clone(),
            id: resource.id.clone(),
            time,
            author: author.to_owned(),
            old_tags: join_tags(old),
            new_tags: join_tags(new),
        }
    }

    #[must_use]
    pub fn resource(&self) -> Resource {
        Resource::new(self.realm.as_str(), self.id.as_str())
    }

    #[must_use]
    pub fn concerns(&self, resource: &Resource) -> bool {
        self.realm == resource.realm && self.id == resource.id
    }

    #[must_use]
    pub fn old_tag_set(&self) -> TagSet {
        self.old_tags.split_whitespace().map(str::to_owned).collect()
    }

    #[must_use]
    pub fn new_tag_set(&self) -> TagSet {
        self.new_tags.split_whitespace().map(str::to_owned).collect()
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.time)
    }
}

/// Tags added and removed by a single mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub added: TagSet,
    pub removed: TagSet,
}

impl TagDiff {
    #[must_use]
    pub fn between(old: &TagSet, new: &TagSet) -> Self {
        Self {
            added: new.difference(old).cloned().collect(),
            removed: old.difference(new).cloned().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Complete image of both tables. Snapshots are shared behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub tags: BTreeSet<TagRow>,
    #[serde(default, rename = "tags_change")]
    pub changes: Vec<TagChangeRecord>,
}

impl Tables {
    fn realm_rows<'tables>(
        &'tables self,
        realm: &'tables str,
    ) -> impl Iterator<Item = &'tables TagRow> + 'tables {
        self.tags
            .range(TagRow::lower_bound(realm, "")..)
            .take_while(move |row| row.realm == realm)
    }

    #[must_use]
    pub fn resource_tags(&self, resource: &Resource) -> TagSet {
        self.tags
            .range(TagRow::lower_bound(&resource.realm, &resource.id)..)
            .take_while(|row| row.realm == resource.realm && row.id == resource.id)
            .map(|row| row.tag.clone())
            .collect()
    }

    /// Resources of `realm` carrying any of `tags` (every tagged resource when
    /// `tags` is `None`), ordered by id, each with its full tag set.
    #[must_use]
    pub fn tagged_resources(
        &self,
        realm: &str,
        tags: Option<&TagSet>,
        filter: &ResourceFilter,
    ) -> Vec<(String, TagSet)> {
        let mut grouped: BTreeMap<&str, TagSet> = BTreeMap::new();
        for row in self.realm_rows(realm) {
            if filter.accepts(&row.id) {
                grouped
                    .entry(row.id.as_str())
                    .or_default()
                    .insert(row.tag.clone());
            }
        }
        grouped
            .into_iter()
            .filter(|(_, resource_tags)| {
                tags.map_or(true, |wanted| !wanted.is_disjoint(resource_tags))
            })
            .map(|(id, resource_tags)| (id.to_owned(), resource_tags))
            .collect()
    }

    /// Number of resources carrying each tag in `realm`.
    #[must_use]
    pub fn frequency(&self, realm: &str, filter: &ResourceFilter) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in self.realm_rows(realm).filter(|row| filter.accepts(&row.id)) {
            let count = counts.entry(row.tag.clone()).or_default();
            *count = count.saturating_add(1);
        }
        counts
    }

    /// The newest record for `resource` at or before `time`. Among records
    /// sharing a timestamp the one written last wins.
    #[must_use]
    pub fn latest_change_at(&self, resource: &Resource, time: i64) -> Option<&TagChangeRecord> {
        self.changes
            .iter()
            .filter(|record| record.concerns(resource) && record.time <= time)
            .max_by_key(|record| record.time)
    }

    /// Every change record of `resource`, newest first.
    #[must_use]
    pub fn changes_for(&self, resource: &Resource) -> Vec<TagChangeRecord> {
        let mut records: Vec<TagChangeRecord> = self
            .changes
            .iter()
            .rev()
            .filter(|record| record.concerns(resource))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.time.cmp(&a.time));
        records
    }
}
