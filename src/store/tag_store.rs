//! Transactional access to the tag tables.

use super::{MemoryBackend, StoreBackend, StoreError, TagChangeRecord, TagDiff, TagRow, Tables};
use crate::tag::{join_tags, Resource, ResourceFilter, TagSet};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

/// Shared handle on the tag tables.
///
/// Readers clone the current snapshot `Arc` and work on it without holding
/// any lock. Writers take the single writer lock through [`TagStore::begin`],
/// mutate a private copy and publish it on commit.
pub struct TagStore {
    backend: Arc<dyn StoreBackend>,
    snapshot: RwLock<Arc<Tables>>,
    writer: Mutex<()>,
}

impl fmt::Debug for TagStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagStore").finish_non_exhaustive()
    }
}

/// A unit of work over the tag tables.
///
/// Nothing is visible to readers until [`Transaction::commit`] succeeds.
/// Dropping the transaction, or calling [`Transaction::rollback`], discards
/// every change.
pub struct Transaction<'store> {
    store: &'store TagStore,
    guard: MutexGuard<'store, ()>,
    tables: Tables,
}

impl Transaction<'_> {
    #[must_use]
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Insert an association. Returns `false` if it already existed.
    pub fn insert_row(&mut self, row: TagRow) -> bool {
        self.tables.tags.insert(row)
    }

    /// Remove an association. Returns `false` if it was absent.
    pub fn remove_row(&mut self, row: &TagRow) -> bool {
        self.tables.tags.remove(row)
    }

    pub fn record_change(&mut self, record: TagChangeRecord) {
        self.tables.changes.push(record);
    }

    /// Rewrite the live tags of `resource` according to `diff`.
    pub fn apply(&mut self, resource: &Resource, diff: &TagDiff) {
        for tag in &diff.removed {
            self.remove_row(&TagRow::new(resource, tag.as_str()));
        }
        for tag in &diff.added {
            self.insert_row(TagRow::new(resource, tag.as_str()));
        }
    }

    /// Persist the working copy and publish it to readers.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; the published snapshot is then unchanged.
    pub async fn commit(self) -> Result<(), StoreError> {
        let Self {
            store,
            guard,
            tables,
        } = self;
        store.backend.persist(&tables).await?;
        *store.snapshot.write().await = Arc::new(tables);
        drop(guard);
        Ok(())
    }

    pub fn rollback(self) {
        debug!("Tag store transaction rolled back");
    }
}

impl TagStore {
    /// Open a store on `backend`, loading its committed tables.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend can't be read.
    pub async fn open(backend: Arc<dyn StoreBackend>) -> Result<Self, StoreError> {
        let tables = backend.load().await?;
        Ok(Self {
            backend,
            snapshot: RwLock::new(Arc::new(tables)),
            writer: Mutex::new(()),
        })
    }

    /// An empty store backed by memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new()),
            snapshot: RwLock::new(Arc::new(Tables::default())),
            writer: Mutex::new(()),
        }
    }

    /// The latest committed tables.
    pub async fn snapshot(&self) -> Arc<Tables> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Start a transaction, waiting for any other writer to finish.
    pub async fn begin(&self) -> Transaction<'_> {
        let guard = self.writer.lock().await;
        let tables = Tables::clone(&*self.snapshot().await);
        Transaction {
            store: self,
            guard,
            tables,
        }
    }

    pub async fn resource_tags(&self, resource: &Resource) -> TagSet {
        self.snapshot().await.resource_tags(resource)
    }

    pub async fn tagged_resources(
        &self,
        realm: &str,
        tags: Option<&TagSet>,
        filter: &ResourceFilter,
    ) -> Vec<(String, TagSet)> {
        self.snapshot().await.tagged_resources(realm, tags, filter)
    }

    pub async fn frequency(&self, realm: &str, filter: &ResourceFilter) -> BTreeMap<String, usize> {
        self.snapshot().await.frequency(realm, filter)
    }

    /// Make `new_tags` the live tag set of `resource`.
    ///
    /// Nothing is written when the set is unchanged. Otherwise the rows are
    /// rewritten and, when `record_history` is set, a change record stamped
    /// `at` (or now) is appended in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the commit fails; no change is then visible.
    pub async fn diff_and_apply(
        &self,
        resource: &Resource,
        new_tags: &TagSet,
        author: &str,
        record_history: bool,
        at: Option<DateTime<Utc>>,
    ) -> Result<TagDiff, StoreError> {
        let mut tx = self.begin().await;
        let old_tags = tx.tables().resource_tags(resource);
        let diff = TagDiff::between(&old_tags, new_tags);
        if diff.is_empty() {
            tx.rollback();
            return Ok(diff);
        }
        tx.apply(resource, &diff);
        if record_history {
            let time = at.unwrap_or_else(Utc::now).timestamp_micros();
            tx.record_change(TagChangeRecord::new(
                resource, time, author, &old_tags, new_tags,
            ));
        }
        tx.commit().await?;
        info!(
            "Tags of {} changed by {}: +[{}] -[{}]",
            resource,
            author,
            join_tags(&diff.added),
            join_tags(&diff.removed)
        );
        Ok(diff)
    }

    /// Drop every live tag of `resource`, keeping its history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the commit fails.
    pub async fn clear(
        &self,
        resource: &Resource,
        author: &str,
        record_history: bool,
    ) -> Result<TagDiff, StoreError> {
        self.diff_and_apply(resource, &TagSet::new(), author, record_history, None)
            .await
    }

    /// Move tags and history of `old` to `new_id` in the same realm.
    ///
    /// Returns the number of associations moved. No change record is written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the commit fails.
    pub async fn reparent(&self, old: &Resource, new_id: &str) -> Result<usize, StoreError> {
        if old.id == new_id {
            return Ok(0);
        }
        let new = Resource::new(old.realm.as_str(), new_id);
        let mut tx = self.begin().await;
        let tags = tx.tables().resource_tags(old);
        for tag in &tags {
            tx.remove_row(&TagRow::new(old, tag.as_str()));
            tx.insert_row(TagRow::new(&new, tag.as_str()));
        }
        let mut moved_records = 0_usize;
        for record in &mut tx.tables.changes {
            if record.concerns(old) {
                record.id = new_id.to_owned();
                moved_records = moved_records.saturating_add(1);
            }
        }
        if tags.is_empty() && moved_records == 0 {
            tx.rollback();
            return Ok(0);
        }
        tx.commit().await?;
        info!(
            "Reparented {} tags and {} change records from {} to {}",
            tags.len(),
            moved_records,
            old,
            new
        );
        Ok(tags.len())
    }

    /// Erase every trace of `resource`: live tags and change records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the commit fails.
    pub async fn purge(&self, resource: &Resource) -> Result<(), StoreError> {
        let mut tx = self.begin().await;
        let tags = tx.tables().resource_tags(resource);
        for tag in &tags {
            tx.remove_row(&TagRow::new(resource, tag.as_str()));
        }
        let before = tx.tables.changes.len();
        tx.tables.changes.retain(|record| !record.concerns(resource));
        if tags.is_empty() && before == tx.tables.changes.len() {
            tx.rollback();
            return Ok(());
        }
        tx.commit().await?;
        info!("Purged tags and tag history of {}", resource);
        Ok(())
    }

    /// Tags of `resource` as of `at`, reconstructed from the change log.
    pub async fn historical_tags(&self, resource: &Resource, at: DateTime<Utc>) -> TagSet {
        self.snapshot()
            .await
            .latest_change_at(resource, at.timestamp_micros())
            .map(TagChangeRecord::new_tag_set)
            .unwrap_or_default()
    }

    /// Change records of `resource`, newest first.
    pub async fn tag_changes(&self, resource: &Resource) -> Vec<TagChangeRecord> {
        self.snapshot().await.changes_for(resource)
    }

    /// Bulk-insert associations without diffing and without history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Integrity`] if any row already exists or occurs
    /// twice in `rows`; nothing is inserted then.
    pub async fn insert_associations(&self, rows: Vec<TagRow>) -> Result<usize, StoreError> {
        let mut tx = self.begin().await;
        let mut inserted = 0_usize;
        for row in rows {
            let label = format!("{}:{} '{}'", row.realm, row.id, row.tag);
            if !tx.insert_row(row) {
                tx.rollback();
                return Err(StoreError::Integrity(format!(
                    "duplicate tag association {label}"
                )));
            }
            inserted = inserted.saturating_add(1);
        }
        if inserted > 0 {
            tx.commit().await?;
        } else {
            tx.rollback();
        }
        Ok(inserted)
    }
}
