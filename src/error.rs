use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single backend read or write
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed stored data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Shared collection lock poisoned")]
    Poisoned,

    #[error("Backend offline")]
    Offline,
}

impl BackendError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackendError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a record store operation
#[derive(Error, Debug)]
pub enum StoreError {
    /// The mutation could not be persisted and was not applied
    #[error("Storage unavailable ({backend}): {source}")]
    StorageUnavailable {
        backend: &'static str,
        #[source]
        source: BackendError,
    },

    /// Every positive local id is taken
    #[error("No free project id left")]
    IdsExhausted,
}

/// Failure to fetch the seed collection on first load
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed seed data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No seed source configured")]
    Missing,
}

/// Outcome of an application message that was rejected
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Admin login required")]
    PermissionDenied,

    #[error("Invalid id or password")]
    AuthFailure,

    #[error(transparent)]
    Storage(#[from] StoreError),
}
