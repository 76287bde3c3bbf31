use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use refract_core::{ID_FIELD, generate_id};
use refract_storage::{Filter, FindQuery, Repository, RepositoryError};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::query::{matches, sort_records};

/// A record plus its insertion sequence, which defines natural order.
#[derive(Debug, Clone)]
struct StoredRecord {
    seq: u64,
    record: Value,
}

/// In-memory repository for one collection, using papaya lock-free HashMap.
///
/// Records are kept as JSON objects keyed by `_id`. Unsorted listings return
/// records in insertion order.
#[derive(Debug)]
pub struct InMemoryRepository {
    collection: String,
    records: PapayaHashMap<String, StoredRecord>,
    seq: AtomicU64,
}

impl InMemoryRepository {
    /// Creates an empty repository bound to `collection`.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            records: PapayaHashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Matching records in insertion order.
    fn matching(&self, filter: &Filter) -> Vec<Value> {
        let guard = self.records.pin();
        let mut found: Vec<&StoredRecord> = guard
            .iter()
            .map(|(_, stored)| stored)
            .filter(|stored| matches(filter, &stored.record))
            .collect();
        found.sort_by_key(|stored| stored.seq);
        found.into_iter().map(|stored| stored.record.clone()).collect()
    }
}

fn as_object<'a>(record: &'a Value) -> Result<&'a Map<String, Value>, RepositoryError> {
    record
        .as_object()
        .ok_or_else(|| RepositoryError::invalid_record("record must be a JSON object"))
}

/// Shallow merge of `changes` into a stored record. `_id` is never replaced.
fn merge(existing: &StoredRecord, changes: &Map<String, Value>) -> StoredRecord {
    let mut merged = existing.clone();
    if let Value::Object(fields) = &mut merged.record {
        for (key, value) in changes {
            if key != ID_FIELD {
                fields.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn count(&self, filter: &Filter) -> Result<u64, RepositoryError> {
        if filter.is_all() {
            return Ok(self.len() as u64);
        }
        Ok(self.matching(filter).len() as u64)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Value>, RepositoryError> {
        let guard = self.records.pin();
        Ok(guard.get(id).map(|stored| stored.record.clone()))
    }

    async fn find(&self, query: &FindQuery) -> Result<Vec<Value>, RepositoryError> {
        let mut records = self.matching(&query.filter);
        sort_records(&mut records, &query.sort);

        let skip = query.skip.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        trace!(
            collection = %self.collection,
            matched = records.len(),
            skip,
            "In-memory find"
        );
        Ok(records.into_iter().skip(skip).take(limit).collect())
    }

    async fn create(&self, record: &Value) -> Result<Value, RepositoryError> {
        let fields = as_object(record)?;
        let id = match fields.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::String(_) | Value::Null) | None => generate_id(),
            Some(other) => {
                return Err(RepositoryError::invalid_record(format!(
                    "{ID_FIELD} must be a string, got {other}"
                )));
            }
        };

        let mut stored = Map::with_capacity(fields.len() + 1);
        stored.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        for (key, value) in fields {
            if key != ID_FIELD {
                stored.insert(key.clone(), value.clone());
            }
        }
        let stored = Value::Object(stored);

        let guard = self.records.pin();
        let entry = StoredRecord {
            seq: self.next_seq(),
            record: stored.clone(),
        };
        if guard.try_insert(id.clone(), entry).is_err() {
            return Err(RepositoryError::already_exists(&self.collection, id));
        }

        debug!(collection = %self.collection, id = %id, "Record created");
        Ok(stored)
    }

    async fn update(&self, id: &str, changes: &Value) -> Result<Option<Value>, RepositoryError> {
        let changes = as_object(changes)?;
        let guard = self.records.pin();
        // Applied to the live entry; a concurrently removed record stays removed.
        let updated = guard.update(id.to_string(), |existing| merge(existing, changes));
        let Some(updated) = updated else {
            return Ok(None);
        };

        debug!(collection = %self.collection, id = %id, "Record updated");
        Ok(Some(updated.record.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, RepositoryError> {
        let removed = self.records.pin().remove(id).is_some();
        debug!(collection = %self.collection, id = %id, removed, "Record delete");
        Ok(removed)
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
