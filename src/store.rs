//! The authoritative in-memory laureate collection with write-through
//! persistence to a single JSON file.
//!
//! Every mutation holds the write lock from index lookup through the file
//! rewrite, so mutations (and their on-disk versions) are totally ordered.
//! Changes are staged on a copy of the collection and only swapped in once
//! the file rewrite succeeded; readers never see an unpersisted change.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, error, info, warn};

use crate::bootstrap::{self, DatasetBootstrapper};
use crate::error::{Error, Result};
use crate::models::{Laureate, LaureatePatch, NewLaureate};

/// On-disk shape: `{ "laureates": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub laureates: Vec<Laureate>,
}

impl Collection {
    pub fn new(laureates: Vec<Laureate>) -> Self {
        Self { laureates }
    }

    pub fn len(&self) -> usize {
        self.laureates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laureates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Laureate> {
        self.laureates.iter().find(|laureate| laureate.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.laureates.iter().position(|laureate| laureate.id == id)
    }

    /// `max(numeric ids) + 1`, starting from 0 when no id is numeric.
    pub fn allocate_id(&self) -> Result<String> {
        let max = self
            .laureates
            .iter()
            .filter_map(Laureate::numeric_id)
            .max()
            .unwrap_or(0);
        max.checked_add(1)
            .map(|id| id.to_string())
            .ok_or_else(|| Error::Internal(format!("laureate id space exhausted after {}", max)))
    }

    pub(crate) fn append(&mut self, laureate: Laureate) {
        self.laureates.push(laureate);
    }

    pub(crate) fn replace_at(&mut self, index: usize, laureate: Laureate) {
        self.laureates[index] = laureate;
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Laureate {
        self.laureates.remove(index)
    }
}

pub struct RecordStore {
    collection: RwLock<Collection>,
    path: PathBuf,
}

impl RecordStore {
    /// Wrap an existing collection without touching the file.
    pub fn new(path: impl Into<PathBuf>, collection: Collection) -> Self {
        Self {
            collection: RwLock::new(collection),
            path: path.into(),
        }
    }

    /// Load the data file as-is, or bootstrap and persist a simplified
    /// collection when the file does not exist yet.
    pub async fn load_or_bootstrap(
        path: impl Into<PathBuf>,
        bootstrapper: &dyn DatasetBootstrapper,
    ) -> Result<Self> {
        let path = path.into();

        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Error::Corrupt(format!("{}: {}", path.display(), e)))?
        {
            let collection = read_collection(&path).await?;
            info!(
                path = %path.display(),
                laureates = collection.len(),
                "Loaded laureates from data file"
            );
            return Ok(Self::new(path, collection));
        }

        info!(path = %path.display(), "No data file found, bootstrapping dataset");
        let raw = match bootstrapper.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Dataset bootstrap failed, starting with an empty collection");
                return Ok(Self::new(path, Collection::default()));
            }
        };

        let collection = match bootstrap::simplify_all(&raw) {
            Ok(collection) => collection,
            Err(e) => {
                warn!(error = %e, "Could not simplify upstream records, starting with an empty collection");
                return Ok(Self::new(path, Collection::default()));
            }
        };
        if collection.is_empty() {
            warn!("Bootstrap source returned no usable laureates");
            return Ok(Self::new(path, collection));
        }

        write_collection(&path, &collection)
            .await
            .map_err(|e| Error::Bootstrap(format!("could not persist bootstrapped data: {}", e)))?;
        info!(
            path = %path.display(),
            laureates = collection.len(),
            "Bootstrapped and persisted dataset"
        );

        Ok(Self::new(path, collection))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.collection.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.collection.read().await.is_empty()
    }

    /// Consistent read view; mutations wait until the guard is dropped.
    pub async fn snapshot(&self) -> RwLockReadGuard<'_, Collection> {
        self.collection.read().await
    }

    pub async fn get(&self, id: &str) -> Option<Laureate> {
        self.collection.read().await.get(id).cloned()
    }

    /// Case-insensitive substring match on `fullName`, in collection order.
    pub async fn search(&self, query: &str) -> Vec<Laureate> {
        let needle = query.to_lowercase();
        self.collection
            .read()
            .await
            .laureates
            .iter()
            .filter(|laureate| laureate.full_name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub async fn create(&self, new: NewLaureate) -> Result<Laureate> {
        let mut collection = self.collection.write().await;

        let id = collection.allocate_id()?;
        let laureate = new.into_laureate(id);
        let mut staged = collection.clone();
        staged.append(laureate.clone());

        self.persist(&staged, &laureate.id).await?;
        *collection = staged;
        debug!(id = %laureate.id, "Appended laureate");
        Ok(laureate)
    }

    /// Apply `patch` to the laureate with `id`. The patch is fully validated
    /// before it gets here, so it is applied as a whole.
    pub async fn update(&self, id: &str, patch: LaureatePatch) -> Result<Laureate> {
        let mut collection = self.collection.write().await;

        let index = collection
            .position(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut updated = collection.laureates[index].clone();
        patch.apply_to(&mut updated);
        let mut staged = collection.clone();
        staged.replace_at(index, updated.clone());

        self.persist(&staged, id).await?;
        *collection = staged;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<Laureate> {
        let mut collection = self.collection.write().await;

        let index = collection
            .position(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let mut staged = collection.clone();
        let removed = staged.remove_at(index);

        self.persist(&staged, id).await?;
        *collection = staged;
        Ok(removed)
    }

    /// Rewrite the whole data file. Called with the write lock held.
    async fn persist(&self, collection: &Collection, id: &str) -> Result<()> {
        write_collection(&self.path, collection).await.map_err(|e| {
            error!(
                id = %id,
                path = %self.path.display(),
                error = %e,
                "Failed to persist laureates"
            );
            Error::Persistence {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

async fn read_collection(path: &Path) -> Result<Collection> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::Corrupt(format!("{}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Corrupt(format!("{}: {}", path.display(), e)))
}

/// Write to a sibling temp file, then rename over the data file.
async fn write_collection(path: &Path, collection: &Collection) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(collection)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await
}
