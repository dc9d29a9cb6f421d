//! # In-Memory Submission Store
//!
//! All operations are synchronous under a `parking_lot::RwLock` that is never
//! held across an `.await`. The lock is non-poisonable, so a panicking writer
//! cannot wedge later issuances.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cpsrn_core::{CategoryTag, RegistryNumber};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::record::{SubmissionId, SubmissionRecord};
use crate::store::SubmissionStore;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<SubmissionRecord>,
    counts: HashMap<CategoryTag, i64>,
    numbers: HashSet<RegistryNumber>,
    ids: HashSet<SubmissionId>,
}

impl Inner {
    fn insert(&mut self, record: SubmissionRecord) -> Result<(), StoreError> {
        if self.numbers.contains(&record.registry_number) {
            return Err(StoreError::Conflict(format!(
                "registry number {} already issued",
                record.registry_number
            )));
        }
        if self.ids.contains(&record.id) {
            return Err(StoreError::Conflict(format!("{} already stored", record.id)));
        }
        *self.counts.entry(record.category_tag.clone()).or_insert(0) += 1;
        self.numbers.insert(record.registry_number.clone());
        self.ids.insert(record.id);
        self.records.push(record);
        Ok(())
    }
}

/// Thread-safe, cloneable submission store kept in process memory.
///
/// Clones share the same underlying records.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemorySubmissionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with historical records.
    pub fn with_records(
        records: impl IntoIterator<Item = SubmissionRecord>,
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for record in records {
                inner.insert(record)?;
            }
        }
        Ok(store)
    }

    /// Snapshot of all records in persistence order.
    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.inner.read().records.clone()
    }

    /// Records carrying `tag`, in persistence order.
    pub fn records_with_tag(&self, tag: &CategoryTag) -> Vec<SubmissionRecord> {
        self.inner
            .read()
            .records
            .iter()
            .filter(|r| &r.category_tag == tag)
            .cloned()
            .collect()
    }

    /// Retrieve a record by id.
    pub fn get(&self, id: &SubmissionId) -> Option<SubmissionRecord> {
        self.inner.read().records.iter().find(|r| &r.id == id).cloned()
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    async fn count_by_category_tag(&self, tag: &CategoryTag) -> Result<i64, StoreError> {
        Ok(self.inner.read().counts.get(tag).copied().unwrap_or(0))
    }

    async fn persist(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        self.inner.write().insert(record.clone())
    }
}
