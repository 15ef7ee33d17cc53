use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::backend::{Backend, Change};
use super::data::{ProjectDraft, ProjectRecord, RecordId};
use super::edit::ProjectPatch;
use super::seed::SeedSource;
use super::subscription::{Listeners, Subscription};
use crate::error::{BackendError, SeedError, StoreError};

/// What [`RecordStore::load`] ended up with
#[derive(Debug)]
pub enum LoadReport {
    /// Records came from the backend
    Loaded(usize),
    /// The backend was empty, the seed was fetched and persisted
    Seeded(usize),
    /// The backend was empty and the seed could not be fetched
    BootstrapUnavailable(SeedError),
    /// The backend could not be read or written; working from memory only
    Degraded(BackendError),
}

/// The RecordStore is the single source of truth for the project collection.
///
/// Every mutation is staged on a copy of the collection and handed to the
/// backend as a [`Change`]. The store adopts what the backend reports as
/// stored only after the write succeeded, so a failed write leaves the store
/// exactly as it was.
pub struct RecordStore<B: Backend> {
    backend: B,
    records: Vec<ProjectRecord>,
    /// Used when the backend has no push channel of its own
    listeners: Listeners,
}

impl<B: Backend> RecordStore<B> {
    /// Create an empty store. Call [`load`](Self::load) to read the backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            records: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Populate the collection from the backend, seeding it on first run.
    ///
    /// Never fails: problems are logged and reported in the [`LoadReport`].
    pub fn load(&mut self, seed: &dyn SeedSource) -> LoadReport {
        let stored = match self.backend.read_all() {
            Ok(records) => records,
            Err(e) => {
                warn!("⚠️  Could not read {} backend, starting empty: {e}", self.backend.name());
                self.records.clear();
                return LoadReport::Degraded(e);
            }
        };

        if !stored.is_empty() {
            self.records = dedup_ids(stored);
            info!("🎨 Loaded {} projects from {}", self.records.len(), self.backend.name());
            return LoadReport::Loaded(self.records.len());
        }

        let seeded = match seed.fetch() {
            Ok(records) => dedup_ids(records),
            Err(e) => {
                warn!("⚠️  Seed unavailable, collection stays empty: {e}");
                self.records.clear();
                return LoadReport::BootstrapUnavailable(e);
            }
        };

        if let Err(e) = self.backend.write_all(&seeded) {
            warn!("⚠️  Seeded {} projects but could not persist them: {e}", seeded.len());
            self.records = seeded;
            return LoadReport::Degraded(e);
        }

        self.records = seeded;
        info!("🌱 Seeded {} projects into {}", self.records.len(), self.backend.name());
        self.notify_local();
        LoadReport::Seeded(self.records.len())
    }

    /// The full collection in insertion order
    pub fn list(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by id
    pub fn get_by_id(&self, id: &RecordId) -> Option<&ProjectRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Add a new record and return it with its assigned id
    pub fn create(&mut self, draft: ProjectDraft) -> Result<ProjectRecord, StoreError> {
        let id = self.next_id()?;
        let record = ProjectRecord::from_draft(id, draft);

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next, Change::Insert(&record))?;

        info!("➕ Created project {} ({})", record.id, record.title);
        Ok(record)
    }

    /// Replace the fields present in `patch` on the record with `id`.
    ///
    /// Returns `Ok(None)` without touching storage when no such record exists,
    /// and `Ok(None)` after the write when another session removed it first.
    pub fn update(
        &mut self,
        id: &RecordId,
        patch: ProjectPatch,
    ) -> Result<Option<ProjectRecord>, StoreError> {
        let Some(index) = self.records.iter().position(|r| &r.id == id) else {
            debug!(%id, "update of unknown project ignored");
            return Ok(None);
        };

        let mut next = self.records.clone();
        patch.apply_to(&mut next[index]);
        let updated = next[index].clone();
        self.commit(next, Change::Replace(&updated))?;

        info!("✏️  Updated project {id}");
        Ok(self.get_by_id(id).cloned())
    }

    /// Remove the record with `id`. Returns whether one was removed.
    pub fn delete(&mut self, id: &RecordId) -> Result<bool, StoreError> {
        if self.get_by_id(id).is_none() {
            debug!(%id, "delete of unknown project ignored");
            return Ok(false);
        }

        let next: Vec<ProjectRecord> = self
            .records
            .iter()
            .filter(|r| &r.id != id)
            .cloned()
            .collect();
        self.commit(next, Change::Remove(id))?;

        info!("🗑️  Deleted project {id}");
        Ok(true)
    }

    /// Remove every record
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.commit(Vec::new(), Change::Clear)?;
        info!("🧹 Cleared all projects");
        Ok(())
    }

    /// Call `callback` with the full collection after every persisted change.
    ///
    /// With a push-capable backend this includes changes written by other
    /// sessions sharing the same collection.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[ProjectRecord]) + Send + Sync + 'static,
    {
        match self.backend.listeners() {
            Some(remote) => remote.register(callback),
            None => self.listeners.register(callback),
        }
    }

    /// Re-read the backend and adopt its state. Returns whether anything changed.
    pub fn refresh(&mut self) -> Result<bool, StoreError> {
        let stored = self.backend.read_all().map_err(|source| self.unavailable(source))?;
        let stored = dedup_ids(stored);

        if stored == self.records {
            return Ok(false);
        }

        self.records = stored;
        debug!(count = self.records.len(), "adopted backend state");
        Ok(true)
    }

    /// Adopt a snapshot pushed by the backend, without writing it back
    pub fn replace(&mut self, records: Vec<ProjectRecord>) {
        self.records = dedup_ids(records);
    }

    /// Distinct category tags in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .flat_map(|r| r.category.iter())
            .map(String::as_str)
            .filter(|tag| seen.insert(*tag))
            .collect()
    }

    /// Next id: backend key if it assigns one, else max local id + 1.
    ///
    /// Once `i64::MAX` is taken, the lowest free positive id is used instead.
    fn next_id(&mut self) -> Result<RecordId, StoreError> {
        if let Some(key) = self.backend.assign_key() {
            return Ok(key);
        }

        let taken: HashSet<i64> = self.records.iter().filter_map(|r| r.id.as_local()).collect();
        let max = taken.iter().copied().max().unwrap_or(0);
        if let Some(id) = max.checked_add(1) {
            return Ok(RecordId::Local(id));
        }

        warn!("⚠️  Local ids reached {max}, reusing the lowest free id");
        (1..=i64::MAX)
            .find(|id| !taken.contains(id))
            .map(RecordId::Local)
            .ok_or(StoreError::IdsExhausted)
    }

    /// Persist `change` and adopt the stored collection. On failure the
    /// current state is kept.
    fn commit(&mut self, next: Vec<ProjectRecord>, change: Change<'_>) -> Result<(), StoreError> {
        let stored = match self.backend.apply(&next, change) {
            Ok(stored) => stored,
            Err(source) => {
                warn!("❌ Write to {} failed, change rolled back: {source}", self.backend.name());
                return Err(self.unavailable(source));
            }
        };

        self.records = dedup_ids(stored);
        self.notify_local();
        Ok(())
    }

    fn notify_local(&self) {
        // push-capable backends already told their listeners during the write
        if self.backend.listeners().is_none() {
            self.listeners.notify(&self.records);
        }
    }

    fn unavailable(&self, source: BackendError) -> StoreError {
        StoreError::StorageUnavailable {
            backend: self.backend.name(),
            source,
        }
    }
}

impl<B: Backend> std::fmt::Debug for RecordStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("backend", &self.backend.name())
            .field("records", &self.records.len())
            .finish()
    }
}

/// Keep the first record of each id
fn dedup_ids(records: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
    let mut seen = HashSet::new();
    let total = records.len();
    let unique: Vec<ProjectRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();

    if unique.len() != total {
        warn!("⚠️  Dropped {} projects with duplicate ids", total - unique.len());
    }
    unique
}
