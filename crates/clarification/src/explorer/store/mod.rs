//! Read-only company dataset, loaded once at startup.

mod parser;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::domain::{CompanyName, CompanyRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read company dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid company dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown company '{0}'")]
    UnknownCompany(String),
}

/// Companies keyed by name; iteration order is alphabetical.
#[derive(Debug, Clone, Default)]
pub struct CompanyStore {
    records: BTreeMap<CompanyName, CompanyRecord>,
}

impl CompanyStore {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(file)?;
        info!(path = %path.display(), companies = store.len(), "company dataset loaded");
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        Ok(Self::from_records(parser::parse_records(reader)?))
    }

    /// The first row wins when a name repeats.
    pub fn from_records(records: impl IntoIterator<Item = CompanyRecord>) -> Self {
        let mut by_name = BTreeMap::new();
        for record in records {
            if by_name.contains_key(&record.name) {
                warn!(company = %record.name, "duplicate company row ignored");
                continue;
            }
            by_name.insert(record.name.clone(), record);
        }
        Self { records: by_name }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CompanyRecord> {
        self.records.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&CompanyRecord, StoreError> {
        self.get(name)
            .ok_or_else(|| StoreError::UnknownCompany(name.to_string()))
    }

    /// All company names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.records.keys().map(CompanyName::as_str).collect()
    }

    /// Case-insensitive substring filter over the sorted names.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.names();
        }
        self.records
            .keys()
            .map(CompanyName::as_str)
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Records for the selected names, in selection order. Unknown names are skipped.
    pub fn select<'a, S: AsRef<str>>(&'a self, names: &[S]) -> Vec<&'a CompanyRecord> {
        names
            .iter()
            .filter_map(|name| self.get(name.as_ref()))
            .collect()
    }
}
