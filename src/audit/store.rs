//! Audit store: persistence of past predictions.
//!
//! The resolver and scoreboard only use [`AuditStore`]. Two implementations
//! ship here: an in-memory store and a JSON file store built on top of it.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{NewAudit, PredictionAudit};
use crate::error::AppError;

pub trait AuditStore {
    /// Insert a new pending record and return it with its assigned id.
    fn insert(&mut self, new: NewAudit) -> Result<PredictionAudit, AppError>;

    fn list_all(&self) -> Result<Vec<PredictionAudit>, AppError>;

    /// Unresolved records with `target_date < before`.
    fn list_unresolved(&self, before: NaiveDate) -> Result<Vec<PredictionAudit>, AppError>;

    /// Replace the stored record with the same id.
    fn update(&mut self, record: &PredictionAudit) -> Result<(), AppError>;

    /// Replace several records at once. Stores that persist should apply the
    /// batch all-or-nothing.
    fn update_many(&mut self, records: &[PredictionAudit]) -> Result<(), AppError> {
        records.iter().try_for_each(|r| self.update(r))
    }

    /// Distinct pair codes, ascending.
    fn list_distinct_pairs(&self) -> Result<Vec<String>, AppError>;

    /// Resolved record for `pair` with the latest `target_date`
    /// (ties go to the most recently inserted record).
    fn latest_resolved(&self, pair: &str) -> Result<Option<PredictionAudit>, AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryAuditStore {
    records: Vec<PredictionAudit>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<PredictionAudit>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PredictionAudit] {
        &self.records
    }

    fn next_id(&self) -> u64 {
        self.records.iter().map(|r| r.id).max().map_or(1, |id| id + 1)
    }
}

impl AuditStore for MemoryAuditStore {
    fn insert(&mut self, new: NewAudit) -> Result<PredictionAudit, AppError> {
        let record = PredictionAudit {
            id: self.next_id(),
            currency_pair: new.currency_pair,
            created_at: new.created_at,
            target_date: new.target_date,
            predicted_rate: new.predicted_rate,
            predicted_change_pct: new.predicted_change_pct,
            actual_rate: None,
            actual_change_pct: None,
            trust_label: None,
            is_resolved: false,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<PredictionAudit>, AppError> {
        Ok(self.records.clone())
    }

    fn list_unresolved(&self, before: NaiveDate) -> Result<Vec<PredictionAudit>, AppError> {
        Ok(self
            .records
            .iter()
            .filter(|r| !r.is_resolved && r.target_date < before)
            .cloned()
            .collect())
    }

    fn update(&mut self, record: &PredictionAudit) -> Result<(), AppError> {
        replace_record(&mut self.records, record)
    }

    fn update_many(&mut self, records: &[PredictionAudit]) -> Result<(), AppError> {
        let mut staged = self.records.clone();
        for record in records {
            replace_record(&mut staged, record)?;
        }
        self.records = staged;
        Ok(())
    }

    fn list_distinct_pairs(&self) -> Result<Vec<String>, AppError> {
        let pairs: BTreeSet<&str> = self.records.iter().map(|r| r.currency_pair.as_str()).collect();
        Ok(pairs.into_iter().map(str::to_string).collect())
    }

    fn latest_resolved(&self, pair: &str) -> Result<Option<PredictionAudit>, AppError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.is_resolved && r.currency_pair == pair)
            .max_by_key(|r| (r.target_date, r.id))
            .cloned())
    }
}

/// JSON-file-backed store.
///
/// Every mutation is applied to a copy of the records, written to disk, and
/// only then swapped in. A failed write leaves memory matching the file.
#[derive(Debug)]
pub struct JsonAuditStore {
    path: PathBuf,
    inner: MemoryAuditStore,
}

impl JsonAuditStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let records = if path.exists() {
            read_records(&path)?
        } else {
            Vec::new()
        };
        debug!(path = %path.display(), records = records.len(), "opened audit store");
        Ok(Self {
            path,
            inner: MemoryAuditStore::from_records(records),
        })
    }

    fn commit(&mut self, staged: MemoryAuditStore) -> Result<(), AppError> {
        write_records(&self.path, staged.records())?;
        self.inner = staged;
        Ok(())
    }
}

impl AuditStore for JsonAuditStore {
    fn insert(&mut self, new: NewAudit) -> Result<PredictionAudit, AppError> {
        let mut staged = self.inner.clone();
        let record = staged.insert(new)?;
        self.commit(staged)?;
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<PredictionAudit>, AppError> {
        self.inner.list_all()
    }

    fn list_unresolved(&self, before: NaiveDate) -> Result<Vec<PredictionAudit>, AppError> {
        self.inner.list_unresolved(before)
    }

    fn update(&mut self, record: &PredictionAudit) -> Result<(), AppError> {
        self.update_many(std::slice::from_ref(record))
    }

    fn update_many(&mut self, records: &[PredictionAudit]) -> Result<(), AppError> {
        let mut staged = self.inner.clone();
        staged.update_many(records)?;
        self.commit(staged)
    }

    fn list_distinct_pairs(&self) -> Result<Vec<String>, AppError> {
        self.inner.list_distinct_pairs()
    }

    fn latest_resolved(&self, pair: &str) -> Result<Option<PredictionAudit>, AppError> {
        self.inner.latest_resolved(pair)
    }
}

fn replace_record(records: &mut [PredictionAudit], record: &PredictionAudit) -> Result<(), AppError> {
    let slot = records
        .iter_mut()
        .find(|r| r.id == record.id)
        .ok_or_else(|| AppError::storage(format!("No audit record with id {}.", record.id)))?;
    *slot = record.clone();
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<PredictionAudit>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::storage(format!("Failed to open audit store '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::storage(format!("Invalid audit store JSON '{}': {e}", path.display())))
}

fn write_records(path: &Path, records: &[PredictionAudit]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::storage(format!("Failed to create audit dir '{}': {e}", parent.display()))
        })?;
    }
    // Write-then-rename so a crash never leaves a truncated store.
    let tmp = path.with_extension("json.tmp");
    let file = File::create(&tmp)
        .map_err(|e| AppError::storage(format!("Failed to create '{}': {e}", tmp.display())))?;
    serde_json::to_writer_pretty(file, records)
        .map_err(|e| AppError::storage(format!("Failed to write audit store: {e}")))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| AppError::storage(format!("Failed to replace '{}': {e}", path.display())))?;
    Ok(())
}
