//! Ordered, id-keyed record collections bound to a REST resource.
//!
//! A [`Collection`] holds records of a single [`Record`] type and knows the
//! resource path it synchronizes with. Local mutations (`add`, `remove`,
//! `reset`, `set`) and remote ones (`fetch`, `create`, `save`, `patch`,
//! `destroy`) deliver [`CollectionEvent`]s to every subscriber. Delivery is
//! unbounded: a bulk merge queues one event per record and none are dropped.
//!
//! Remote operations only touch the record list once the response is fully
//! decoded: a failed request leaves the collection as it was, reports the
//! failure to subscribers as [`CollectionEvent::Error`] and returns it.

mod error;
mod events;
mod graph;

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::client::RestClient;
use crate::models::{Record, RecordId};

pub use error::*;
pub use events::*;
pub use graph::*;

/// Computes the effective resource URL from the configured path.
pub type UrlResolver = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Options for [`Collection::fetch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Replace all members and emit a single `Reset` instead of merging.
    pub reset: bool,
}

/// Records of one [`Record`] type kept in sync with a REST resource.
pub struct Collection<T: Record> {
    client: RestClient,
    url: String,
    resolver: Option<UrlResolver>,
    records: Vec<T>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<CollectionEvent<T>>>>,
}

impl<T: Record> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("url", &self.url)
            .field("resolver", &self.resolver.is_some())
            .field("len", &self.records.len())
            .finish()
    }
}

/// Builder for [`Collection`].
pub struct CollectionBuilder<T: Record> {
    client: RestClient,
    url: Option<String>,
    resolver: Option<UrlResolver>,
    records: Vec<T>,
}

impl<T: Record> CollectionBuilder<T> {
    /// Resource path (relative to the client's base URL) or absolute URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Derive the effective URL from the configured path, e.g. to scope the
    /// resource to a single view.
    pub fn url_resolver(
        mut self,
        resolver: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        let resolver: UrlResolver = Arc::new(resolver);
        self.resolver = Some(resolver);
        self
    }

    /// Initial members. No events are emitted for them.
    pub fn records(mut self, records: Vec<T>) -> Self {
        self.records = records;
        self
    }

    /// Finish the collection. Fails with [`CollectionError::InvalidUrl`]
    /// when no non-empty URL was given.
    pub fn build(self) -> Result<Collection<T>, CollectionError> {
        let url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or(CollectionError::InvalidUrl)?;
        let mut collection = Collection::from_parts(self.client, url, self.resolver);
        collection.records = dedup(self.records);
        Ok(collection)
    }
}

impl<T: Record> Collection<T> {
    /// Start configuring a collection that talks through `client`.
    pub fn builder(client: RestClient) -> CollectionBuilder<T> {
        CollectionBuilder {
            client,
            url: None,
            resolver: None,
            records: Vec::new(),
        }
    }

    fn from_parts(client: RestClient, url: String, resolver: Option<UrlResolver>) -> Self {
        Self {
            client,
            url,
            resolver,
            records: Vec::new(),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    // ============================================================
    // Accessors
    // ============================================================

    /// The resource path as configured.
    pub fn configured_url(&self) -> &str {
        &self.url
    }

    /// The URL requests are issued against.
    pub fn url(&self) -> String {
        match &self.resolver {
            Some(resolve) => resolve(&self.url),
            None => self.url.clone(),
        }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.position(id).map(|i| &self.records[i])
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Identifiers of the saved members, in collection order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().filter_map(|r| r.id().cloned()).collect()
    }

    /// Subscribe to change notifications. Events sent before subscribing are
    /// not replayed.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CollectionEvent<T>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(tx);
        rx
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == Some(id))
    }

    /// Deliver `event` to every live subscriber, forgetting dropped ones.
    fn emit(&self, event: CollectionEvent<T>) {
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    // ============================================================
    // Local operations
    // ============================================================

    /// Add a record, merging it into an existing member with the same id.
    pub fn add(&mut self, record: T) -> Result<(), CollectionError> {
        self.check(&record)?;
        self.insert(record);
        Ok(())
    }

    /// Remove the member with the given id.
    pub fn remove(&mut self, id: &RecordId) -> Option<T> {
        let index = self.position(id)?;
        let record = self.records.remove(index);
        self.emit(CollectionEvent::Remove(record.clone()));
        Some(record)
    }

    /// Replace all members at once. Emits a single `Reset`.
    pub fn reset(&mut self, records: Vec<T>) {
        self.records = dedup(records);
        self.emit(CollectionEvent::Reset);
    }

    /// Merge a full listing into the collection: new records are added,
    /// known ones replaced, members missing from `records` removed.
    pub fn set(&mut self, records: Vec<T>) {
        let incoming: HashSet<RecordId> = records.iter().filter_map(|r| r.id().cloned()).collect();

        let (kept, dropped): (Vec<T>, Vec<T>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.id().is_some_and(|id| incoming.contains(id)));
        self.records = kept;
        for record in dropped {
            self.emit(CollectionEvent::Remove(record));
        }

        for record in records {
            self.insert(record);
        }
    }

    fn check(&self, record: &T) -> Result<(), CollectionError> {
        record.validate().map_err(|reason| {
            tracing::warn!("Rejected invalid record: {}", reason);
            self.emit(CollectionEvent::Invalid(reason.clone()));
            CollectionError::Invalid(reason)
        })
    }

    fn insert(&mut self, record: T) {
        match record.id().and_then(|id| self.position(id)) {
            Some(index) => {
                if self.records[index] != record {
                    self.records[index] = record.clone();
                    self.emit(CollectionEvent::Change(record));
                }
            }
            None => {
                self.records.push(record.clone());
                self.emit(CollectionEvent::Add(record));
            }
        }
    }

    /// Broadcast a failed remote operation and hand it back to the caller.
    fn fail<R>(&self, err: CollectionError) -> Result<R, CollectionError> {
        tracing::warn!("Sync with {} failed: {}", self.url(), err);
        self.emit(CollectionEvent::Error(err.to_string()));
        Err(err)
    }

    // ============================================================
    // Remote operations
    // ============================================================

    /// Read the resource and update the collection from it. Returns the
    /// number of members afterwards.
    pub async fn fetch(&mut self, options: FetchOptions) -> Result<usize, CollectionError> {
        let url = self.url();
        self.emit(CollectionEvent::Request);

        let records = match self.fetch_records(&url).await {
            Ok(records) => records,
            Err(e) => return self.fail(e),
        };
        tracing::debug!("Fetched {} records from {}", records.len(), url);

        if options.reset {
            self.reset(records);
        } else {
            self.set(records);
        }
        self.emit(CollectionEvent::Sync);
        Ok(self.len())
    }

    async fn fetch_records(&self, url: &str) -> Result<Vec<T>, CollectionError> {
        let Value::Array(items) = self.client.list(url).await? else {
            return Err(CollectionError::NotAnArray);
        };
        Ok(items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?)
    }

    /// Create a record on the server and add the saved version (carrying the
    /// server-assigned id) to the collection.
    pub async fn create(&mut self, record: T) -> Result<T, CollectionError> {
        self.check(&record)?;
        let url = self.url();
        self.emit(CollectionEvent::Request);

        let saved = match self.push_create(&url, &record).await {
            Ok(saved) => saved,
            Err(e) => return self.fail(e),
        };
        self.insert(saved.clone());
        self.emit(CollectionEvent::Sync);
        Ok(saved)
    }

    async fn push_create(&self, url: &str, record: &T) -> Result<T, CollectionError> {
        let body = serde_json::to_value(record)?;
        decode_or(self.client.create(url, &body).await?, record)
    }

    /// Persist a record: new records are created, saved ones replaced with
    /// `PUT`.
    pub async fn save(&mut self, record: T) -> Result<T, CollectionError> {
        let Some(id) = record.id().cloned() else {
            return self.create(record).await;
        };
        self.check(&record)?;
        let url = self.url();
        self.emit(CollectionEvent::Request);

        let saved = match self.push_update(&url, &id, &record).await {
            Ok(saved) => saved,
            Err(e) => return self.fail(e),
        };
        self.insert(saved.clone());
        self.emit(CollectionEvent::Sync);
        Ok(saved)
    }

    async fn push_update(&self, url: &str, id: &RecordId, record: &T) -> Result<T, CollectionError> {
        let body = serde_json::to_value(record)?;
        decode_or(self.client.update(url, id, &body).await?, record)
    }

    /// Send a partial update. When the server does not echo the record, the
    /// attributes are merged into the local copy.
    pub async fn patch(&mut self, id: &RecordId, attrs: Value) -> Result<T, CollectionError> {
        let url = self.url();
        self.emit(CollectionEvent::Request);

        let saved = match self.push_patch(&url, id, &attrs).await {
            Ok(saved) => saved,
            Err(e) => return self.fail(e),
        };
        self.insert(saved.clone());
        self.emit(CollectionEvent::Sync);
        Ok(saved)
    }

    async fn push_patch(&self, url: &str, id: &RecordId, attrs: &Value) -> Result<T, CollectionError> {
        if let Some(body) = self.client.patch(url, id, attrs).await? {
            return Ok(serde_json::from_value(body)?);
        }
        let local = self
            .get(id)
            .ok_or_else(|| CollectionError::UnknownRecord(id.clone()))?;
        let mut merged = serde_json::to_value(local)?;
        if let (Value::Object(target), Value::Object(changes)) = (&mut merged, attrs) {
            for (key, value) in changes {
                // The id addresses the record; a patch cannot move it.
                if key != "id" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(serde_json::from_value(merged)?)
    }

    /// Delete a record on the server, then drop it from the collection.
    pub async fn destroy(&mut self, id: &RecordId) -> Result<Option<T>, CollectionError> {
        let url = self.url();
        self.emit(CollectionEvent::Request);

        if let Err(e) = self.client.delete(&url, id).await {
            return self.fail(e.into());
        }
        let removed = self.remove(id);
        self.emit(CollectionEvent::Sync);
        Ok(removed)
    }
}

impl<'a, T: Record> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Decode the server's echo of a record, falling back to what was sent when
/// the response had no body.
fn decode_or<T: Record>(body: Option<Value>, sent: &T) -> Result<T, CollectionError> {
    match body {
        Some(body) => Ok(serde_json::from_value(body)?),
        None => Ok(sent.clone()),
    }
}

/// Collapse records sharing an id; the last occurrence wins and keeps the
/// position of the first.
fn dedup<T: Record>(records: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(records.len());
    for record in records {
        let existing = record
            .id()
            .and_then(|id| out.iter().position(|r| r.id() == Some(id)));
        match existing {
            Some(index) => out[index] = record,
            None => out.push(record),
        }
    }
    out
}
