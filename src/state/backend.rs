//! Persistence backends for the record store
//!
//! The store reads and rewrites the whole collection, and hands each
//! mutation to [`Backend::apply`] as a single-record [`Change`]. Backends
//! that assign their own ids or push changes from other sessions say so via
//! [`Backend::assign_key`] and [`Backend::listeners`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use super::data::{ProjectRecord, RecordId};
use super::subscription::Listeners;
use crate::error::BackendError;

/// One mutation of the collection, as the store made it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<'a> {
    Insert(&'a ProjectRecord),
    /// Replace the record with the same id
    Replace(&'a ProjectRecord),
    Remove(&'a RecordId),
    Clear,
}

impl Change<'_> {
    /// Apply to `records` in place. Replacing or removing a missing id does nothing.
    pub fn apply_to(self, records: &mut Vec<ProjectRecord>) {
        match self {
            Change::Insert(record) => records.push(record.clone()),
            Change::Replace(record) => {
                if let Some(slot) = records.iter_mut().find(|r| r.id == record.id) {
                    *slot = record.clone();
                }
            }
            Change::Remove(id) => records.retain(|r| &r.id != id),
            Change::Clear => records.clear(),
        }
    }
}

/// Durable storage behind a [`RecordStore`](super::library::RecordStore)
pub trait Backend {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Read the stored collection. Nothing stored yet reads as empty.
    fn read_all(&self) -> Result<Vec<ProjectRecord>, BackendError>;

    /// Replace the stored collection
    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), BackendError>;

    /// Persist one change and return the collection as stored afterwards.
    ///
    /// `staged` is the store's own collection with `change` already applied.
    /// Single-writer backends store it as is. Backends shared between
    /// sessions apply `change` to their current state instead, so records
    /// written by other sessions survive.
    fn apply(
        &mut self,
        staged: &[ProjectRecord],
        change: Change<'_>,
    ) -> Result<Vec<ProjectRecord>, BackendError> {
        let _ = change;
        self.write_all(staged)?;
        Ok(staged.to_vec())
    }

    /// A fresh id for a new record, when the backend assigns ids itself.
    /// `None` means the store assigns ascending local ids.
    fn assign_key(&mut self) -> Option<RecordId> {
        None
    }

    /// Push channel for changes made by any session, if the backend has one
    fn listeners(&self) -> Option<&Listeners> {
        None
    }
}

/// Lets the backend be picked at runtime from configuration
impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read_all(&self) -> Result<Vec<ProjectRecord>, BackendError> {
        (**self).read_all()
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), BackendError> {
        (**self).write_all(records)
    }

    fn apply(
        &mut self,
        staged: &[ProjectRecord],
        change: Change<'_>,
    ) -> Result<Vec<ProjectRecord>, BackendError> {
        (**self).apply(staged, change)
    }

    fn assign_key(&mut self) -> Option<RecordId> {
        (**self).assign_key()
    }

    fn listeners(&self) -> Option<&Listeners> {
        (**self).listeners()
    }
}

/// Ephemeral backend, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Vec<ProjectRecord>,
    offline: bool,
    writes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already stored collection
    pub fn with_records(records: Vec<ProjectRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Make every read and write fail until switched back
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read_all(&self) -> Result<Vec<ProjectRecord>, BackendError> {
        if self.offline {
            return Err(BackendError::Offline);
        }
        Ok(self.records.clone())
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), BackendError> {
        if self.offline {
            return Err(BackendError::Offline);
        }
        self.records = records.to_vec();
        self.writes += 1;
        Ok(())
    }
}

/// Whole collection as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn read_all(&self) -> Result<Vec<ProjectRecord>, BackendError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackendError::io(&self.path, e)),
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| BackendError::io(parent, e))?;
        }

        // Write next to the target and rename, so readers never see half a file
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(records)?;
        fs::write(&tmp, body).map_err(|e| BackendError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| BackendError::io(&self.path, e))?;

        debug!(path = %self.path.display(), count = records.len(), "collection written");
        Ok(())
    }
}

#[derive(Default)]
struct SharedState {
    records: Vec<ProjectRecord>,
    offline: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<SharedState>,
    listeners: Listeners,
    next_seq: AtomicU64,
}

/// A collection shared by every session holding a clone of this handle.
///
/// Behaves like a hosted document database: it assigns opaque string keys,
/// applies each change to the current shared state, and pushes the result
/// to all listeners, whichever session wrote it. Concurrent changes to the
/// same record are last-write-wins.
#[derive(Clone, Default)]
pub struct SharedBackend {
    inner: Arc<Shared>,
}

impl SharedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, SharedState>, BackendError> {
        self.inner.state.lock().map_err(|_| BackendError::Poisoned)
    }

    /// Simulate losing the connection to the collection
    pub fn set_offline(&self, offline: bool) -> Result<(), BackendError> {
        self.state()?.offline = offline;
        Ok(())
    }

    /// Edit the shared records under the lock, then push the result
    fn modify(
        &self,
        edit: impl FnOnce(&mut Vec<ProjectRecord>),
    ) -> Result<Vec<ProjectRecord>, BackendError> {
        let records = {
            let mut state = self.state()?;
            if state.offline {
                return Err(BackendError::Offline);
            }
            edit(&mut state.records);
            state.records.clone()
        };

        self.inner.listeners.notify(&records);
        Ok(records)
    }
}

impl std::fmt::Debug for SharedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBackend")
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

impl Backend for SharedBackend {
    fn name(&self) -> &'static str {
        "shared"
    }

    fn read_all(&self) -> Result<Vec<ProjectRecord>, BackendError> {
        let state = self.state()?;
        if state.offline {
            return Err(BackendError::Offline);
        }
        Ok(state.records.clone())
    }

    fn write_all(&mut self, records: &[ProjectRecord]) -> Result<(), BackendError> {
        self.modify(|stored| *stored = records.to_vec())?;
        Ok(())
    }

    fn apply(
        &mut self,
        _staged: &[ProjectRecord],
        change: Change<'_>,
    ) -> Result<Vec<ProjectRecord>, BackendError> {
        self.modify(|stored| change.apply_to(stored))
    }

    /// `<millis as 12 hex digits>-<sequence>`: never all digits, never ambiguous
    fn assign_key(&mut self) -> Option<RecordId> {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let millis = Utc::now().timestamp_millis();
        Some(RecordId::Key(format!("{millis:012x}-{seq:x}")))
    }

    fn listeners(&self) -> Option<&Listeners> {
        Some(&self.inner.listeners)
    }
}
