//! Durable homes for the tag tables.

use super::{StoreError, Tables};
use crate::utils::atomic_write;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// Where committed tables are read from and written to.
///
/// `persist` must replace the stored image as a whole: either the new
/// tables become visible or the previous ones remain.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn load(&self) -> Result<Tables, StoreError>;

    async fn persist(&self, tables: &Tables) -> Result<(), StoreError>;
}

/// Volatile backend, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    reject_writes: AtomicBool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: Mutex::new(tables),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Make every following `persist` fail, simulating a broken medium.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn load(&self) -> Result<Tables, StoreError> {
        Ok(self.tables.lock().await.clone())
    }

    async fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory backend is rejecting writes".to_owned(),
            ));
        }
        *self.tables.lock().await = tables.clone();
        Ok(())
    }
}

/// Tables serialized as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StoreBackend for JsonFileBackend {
    async fn load(&self) -> Result<Tables, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let tables: Tables = serde_json::from_str(&content)?;
                debug!(
                    "Loaded {} tag rows and {} change records from {}",
                    tables.tags.len(),
                    tables.changes.len(),
                    self.path.display()
                );
                Ok(tables)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No tag store at {}; starting empty", self.path.display());
                Ok(Tables::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(tables)?;
        atomic_write(&self.path, &content).await?;
        Ok(())
    }
}
