use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::{GraphRecord, RecordId};

/// In-memory backing store for the graph resource.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    records: Arc<Mutex<Vec<GraphRecord>>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `records`. Records without an id get one.
    pub fn with_records(records: Vec<GraphRecord>) -> Self {
        let store = Self::new();
        for record in records {
            // Seed ids are unique unless the caller repeats one; keep the first.
            let _ = store.insert(record);
        }
        store
    }

    pub fn list(&self) -> Vec<GraphRecord> {
        self.records.lock().expect("store lock poisoned").clone()
    }

    pub fn get(&self, id: &RecordId) -> Option<GraphRecord> {
        let records = self.records.lock().expect("store lock poisoned");
        records.iter().find(|r| same_id(r, id)).cloned()
    }

    /// Store a new record, assigning a UUID when it has no id.
    /// Returns `None` when the id is already taken.
    pub fn insert(&self, mut record: GraphRecord) -> Option<GraphRecord> {
        let mut records = self.records.lock().expect("store lock poisoned");
        let id = record
            .id
            .get_or_insert_with(|| RecordId::Str(Uuid::new_v4().to_string()))
            .clone();
        if records.iter().any(|r| same_id(r, &id)) {
            return None;
        }
        records.push(record.clone());
        Some(record)
    }

    /// Replace the record stored under `id`. The stored id wins over any id
    /// in the body.
    pub fn replace(&self, id: &RecordId, mut record: GraphRecord) -> Option<GraphRecord> {
        let mut records = self.records.lock().expect("store lock poisoned");
        let slot = records.iter_mut().find(|r| same_id(r, id))?;
        record.id = slot.id.clone();
        *slot = record.clone();
        Some(record)
    }

    /// Merge `changes` into the attributes of the record stored under `id`.
    pub fn merge(&self, id: &RecordId, changes: Map<String, Value>) -> Option<GraphRecord> {
        let mut records = self.records.lock().expect("store lock poisoned");
        let slot = records.iter_mut().find(|r| same_id(r, id))?;
        for (key, value) in changes {
            if key != "id" {
                slot.attributes.insert(key, value);
            }
        }
        Some(slot.clone())
    }

    pub fn delete(&self, id: &RecordId) -> bool {
        let mut records = self.records.lock().expect("store lock poisoned");
        let before = records.len();
        records.retain(|r| !same_id(r, id));
        records.len() != before
    }
}

/// Path segments carry no JSON type, so `Int(42)` and `Str("42")` are the
/// same record here.
fn same_id(record: &GraphRecord, id: &RecordId) -> bool {
    record
        .id
        .as_ref()
        .is_some_and(|stored| stored.to_string() == id.to_string())
}
