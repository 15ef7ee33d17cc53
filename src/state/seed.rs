//! Bootstrap data for an empty store
//!
//! Only consulted by [`RecordStore::load`](super::library::RecordStore::load)
//! when the backend holds no records.

use std::fs;
use std::path::PathBuf;

use super::data::ProjectRecord;
use crate::error::SeedError;

/// Read-only source of the initial project collection
pub trait SeedSource {
    fn fetch(&self) -> Result<Vec<ProjectRecord>, SeedError>;
}

/// A `projects.json` file holding an array of records
#[derive(Debug, Clone)]
pub struct JsonSeedFile {
    path: PathBuf,
}

impl JsonSeedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeedSource for JsonSeedFile {
    fn fetch(&self) -> Result<Vec<ProjectRecord>, SeedError> {
        let text = fs::read_to_string(&self.path).map_err(|source| SeedError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// No bootstrap data available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSeed;

impl SeedSource for NoSeed {
    fn fetch(&self) -> Result<Vec<ProjectRecord>, SeedError> {
        Err(SeedError::Missing)
    }
}

impl SeedSource for Vec<ProjectRecord> {
    fn fetch(&self) -> Result<Vec<ProjectRecord>, SeedError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(
            &path,
            r#"[{"id": 1, "title": "Folio", "headline": "", "overview": "",
                 "imageSrc": "", "techStack": [], "category": ["web"],
                 "links": {"github": "", "site": ""}}]"#,
        )
        .unwrap();

        let records = JsonSeedFile::new(&path).fetch().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Folio");
    }

    #[test]
    fn test_missing_seed_file() {
        let seed = JsonSeedFile::new("/nonexistent/folio/projects.json");
        assert!(matches!(seed.fetch(), Err(SeedError::Io { .. })));
    }

    #[test]
    fn test_no_seed() {
        assert!(matches!(NoSeed.fetch(), Err(SeedError::Missing)));
    }
}
