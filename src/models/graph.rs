use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Record, RecordId};

/// A netmap graph entity.
///
/// The graph endpoint decides what a record carries (topology layer, view
/// settings, node and link lists), so everything except `id` is kept as
/// JSON attributes and flattened on the wire:
///
/// ```json
/// { "id": 3, "layer": 2, "nodes": [], "links": [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl GraphRecord {
    /// An unsaved record without attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A record carrying a server identifier.
    pub fn with_id(id: impl Into<RecordId>) -> Self {
        Self {
            id: Some(id.into()),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Set an attribute. `id` is routed to the identifier so it never ends up
    /// duplicated inside the flattened attributes: `null` clears it, and a
    /// value that is not a valid identifier leaves it unchanged.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if key == "id" {
            if let Ok(id) = serde_json::from_value::<Option<RecordId>>(value) {
                self.id = id;
            }
        } else {
            self.attributes.insert(key, value);
        }
    }
}

impl Record for GraphRecord {
    fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }
}
