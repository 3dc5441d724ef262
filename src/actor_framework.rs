use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;
use crate::query::{Document, Filter, Update, UpdateResult};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any record stored in a collection must implement.
///
/// Records travel through the collection actor as plain documents; the typed
/// clients convert at the boundary with [`Record::to_document`] and
/// [`Record::from_document`].
pub trait Record: Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static {
    /// Name of the collection the record lives in.
    const COLLECTION: &'static str;
    /// Field holding the record's unique code.
    const KEY: &'static str;

    fn key(&self) -> &str;

    fn to_document(&self) -> Result<Document, StoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(doc)) => Ok(doc),
            Ok(other) => Err(malformed::<Self>(format!("expected an object, got {}", other))),
            Err(e) => Err(malformed::<Self>(e.to_string())),
        }
    }

    /// Decodes a stored document. Override to accept older document shapes.
    fn from_document(doc: Document) -> Result<Self, StoreError> {
        serde_json::from_value(Value::Object(doc)).map_err(|e| malformed::<Self>(e.to_string()))
    }

    /// Filter selecting this record by its code.
    fn key_filter(code: &str) -> Filter {
        Filter::eq(Self::KEY, code)
    }
}

pub fn malformed<T: Record>(reason: impl Into<String>) -> StoreError {
    StoreError::Malformed {
        collection: T::COLLECTION.to_string(),
        reason: reason.into(),
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum CollectionRequest {
    InsertOne {
        document: Document,
        respond_to: Response<()>,
    },
    Find {
        filter: Filter,
        respond_to: Response<Vec<Document>>,
    },
    FindOne {
        filter: Filter,
        respond_to: Response<Option<Document>>,
    },
    UpdateOne {
        filter: Filter,
        update: Update,
        respond_to: Response<UpdateResult>,
    },
    DeleteOne {
        filter: Filter,
        respond_to: Response<Option<Document>>,
    },
    DeleteMany {
        filter: Filter,
        respond_to: Response<Vec<Document>>,
    },
    Snapshot {
        respond_to: Response<Vec<Document>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns one collection of documents and applies requests strictly one at a
/// time, so every request is atomic with respect to the others.
pub struct CollectionActor {
    name: &'static str,
    unique_key: &'static str,
    receiver: mpsc::Receiver<CollectionRequest>,
    documents: Vec<Document>,
}

impl CollectionActor {
    pub fn new(
        name: &'static str,
        unique_key: &'static str,
        buffer_size: usize,
        documents: Vec<Document>,
    ) -> (Self, CollectionClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            name,
            unique_key,
            receiver,
            documents,
        };
        (actor, CollectionClient::new(sender))
    }

    /// Actor for the collection `T` lives in, keyed on `T::KEY`.
    pub fn for_record<T: Record>(buffer_size: usize, documents: Vec<Document>) -> (Self, CollectionClient) {
        Self::new(T::COLLECTION, T::KEY, buffer_size, documents)
    }

    #[instrument(name = "collection", fields(collection = self.name), skip(self))]
    pub async fn run(mut self) {
        info!(documents = self.documents.len(), "Collection actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CollectionRequest::InsertOne { document, respond_to } => {
                    let _ = respond_to.send(self.handle_insert_one(document));
                }
                CollectionRequest::Find { filter, respond_to } => {
                    let found: Vec<Document> = self.documents.iter().filter(|d| filter.matches(d)).cloned().collect();
                    debug!(count = found.len(), "Find");
                    let _ = respond_to.send(Ok(found));
                }
                CollectionRequest::FindOne { filter, respond_to } => {
                    let found = self.documents.iter().find(|d| filter.matches(d)).cloned();
                    let _ = respond_to.send(Ok(found));
                }
                CollectionRequest::UpdateOne { filter, update, respond_to } => {
                    let _ = respond_to.send(self.handle_update_one(&filter, &update));
                }
                CollectionRequest::DeleteOne { filter, respond_to } => {
                    let removed = self
                        .documents
                        .iter()
                        .position(|d| filter.matches(d))
                        .map(|index| self.documents.remove(index));
                    debug!(deleted = removed.is_some(), "DeleteOne");
                    let _ = respond_to.send(Ok(removed));
                }
                CollectionRequest::DeleteMany { filter, respond_to } => {
                    let (removed, kept): (Vec<Document>, Vec<Document>) = std::mem::take(&mut self.documents)
                        .into_iter()
                        .partition(|d| filter.matches(d));
                    self.documents = kept;
                    debug!(deleted = removed.len(), "DeleteMany");
                    let _ = respond_to.send(Ok(removed));
                }
                CollectionRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.documents.clone()));
                }
            }
        }
        info!("Collection actor stopped");
    }

    fn handle_insert_one(&mut self, document: Document) -> Result<(), StoreError> {
        if let Some(key) = document.get(self.unique_key).filter(|v| !v.is_null()) {
            let clash = Filter::Eq(self.unique_key.to_string(), key.clone());
            if self.documents.iter().any(|d| clash.matches(d)) {
                warn!(key = %key, "Duplicate key rejected");
                return Err(StoreError::DuplicateKey {
                    collection: self.name.to_string(),
                    key: key.as_str().map(str::to_string).unwrap_or_else(|| key.to_string()),
                });
            }
        }
        self.documents.push(document);
        debug!(documents = self.documents.len(), "InsertOne");
        Ok(())
    }

    fn handle_update_one(&mut self, filter: &Filter, update: &Update) -> Result<UpdateResult, StoreError> {
        let Some(doc) = self.documents.iter_mut().find(|d| filter.matches(d)) else {
            debug!("UpdateOne matched nothing");
            return Ok(UpdateResult::default());
        };
        // Work on a copy so a failed update leaves the stored document untouched.
        let mut updated = doc.clone();
        let modified = update.apply(&mut updated)?;
        *doc = updated;
        Ok(UpdateResult {
            matched: 1,
            modified: u64::from(modified),
        })
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone, Debug)]
pub struct CollectionClient {
    sender: mpsc::Sender<CollectionRequest>,
}

impl CollectionClient {
    pub fn new(sender: mpsc::Sender<CollectionRequest>) -> Self {
        Self { sender }
    }

    async fn call<T>(&self, build: impl FnOnce(Response<T>) -> CollectionRequest) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    pub async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        self.call(|respond_to| CollectionRequest::InsertOne { document, respond_to }).await
    }

    pub async fn find(&self, filter: Filter) -> Result<Vec<Document>, StoreError> {
        self.call(|respond_to| CollectionRequest::Find { filter, respond_to }).await
    }

    pub async fn find_one(&self, filter: Filter) -> Result<Option<Document>, StoreError> {
        self.call(|respond_to| CollectionRequest::FindOne { filter, respond_to }).await
    }

    pub async fn update_one(&self, filter: Filter, update: Update) -> Result<UpdateResult, StoreError> {
        self.call(|respond_to| CollectionRequest::UpdateOne { filter, update, respond_to }).await
    }

    /// Removes the first matching document and hands it back.
    pub async fn delete_one(&self, filter: Filter) -> Result<Option<Document>, StoreError> {
        self.call(|respond_to| CollectionRequest::DeleteOne { filter, respond_to }).await
    }

    /// Removes every matching document and hands them back.
    pub async fn delete_many(&self, filter: Filter) -> Result<Vec<Document>, StoreError> {
        self.call(|respond_to| CollectionRequest::DeleteMany { filter, respond_to }).await
    }

    pub async fn snapshot(&self) -> Result<Vec<Document>, StoreError> {
        self.call(|respond_to| CollectionRequest::Snapshot { respond_to }).await
    }
}

// =============================================================================
// 5. TESTS
// =============================================================================
