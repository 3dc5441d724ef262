//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_find_one`] or [`expect_update_one`] to assert behavior.

use tokio::sync::mpsc;

use crate::actor_framework::{CollectionClient, CollectionRequest, Response};
use crate::query::{Document, Filter, Update, UpdateResult};

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// The workflow clients (`OrderClient`, `CustomerClient`) talk to several
/// collections in a fixed order. Instead of running real `CollectionActor`s,
/// the test holds the receiving end of each channel, inspects every request as
/// it arrives and answers it by hand. This makes failures, races and odd store
/// answers deterministic.
pub fn create_mock_client(buffer_size: usize) -> (CollectionClient, mpsc::Receiver<CollectionRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CollectionClient::new(sender), receiver)
}

/// Helper to verify that the next message is an InsertOne request
pub async fn expect_insert_one(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(Document, Response<()>)> {
    match receiver.recv().await {
        Some(CollectionRequest::InsertOne { document, respond_to }) => Some((document, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Find request
pub async fn expect_find(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(Filter, Response<Vec<Document>>)> {
    match receiver.recv().await {
        Some(CollectionRequest::Find { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a FindOne request
pub async fn expect_find_one(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(Filter, Response<Option<Document>>)> {
    match receiver.recv().await {
        Some(CollectionRequest::FindOne { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an UpdateOne request
pub async fn expect_update_one(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(Filter, Update, Response<UpdateResult>)> {
    match receiver.recv().await {
        Some(CollectionRequest::UpdateOne {
            filter,
            update,
            respond_to,
        }) => Some((filter, update, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a DeleteOne request
pub async fn expect_delete_one(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(Filter, Response<Option<Document>>)> {
    match receiver.recv().await {
        Some(CollectionRequest::DeleteOne { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a DeleteMany request
pub async fn expect_delete_many(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(Filter, Response<Vec<Document>>)> {
    match receiver.recv().await {
        Some(CollectionRequest::DeleteMany { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client(10);

        // Test FindOne
        let find_task = tokio::spawn(async move { client.find_one(Filter::eq("code", "w1")).await });

        let (filter, responder) = expect_find_one(&mut receiver).await.expect("Expected FindOne request");
        assert_eq!(filter, Filter::eq("code", "w1"));
        let mut doc = Document::new();
        doc.insert("code".into(), json!("w1"));
        responder.send(Ok(Some(doc.clone()))).unwrap();

        let result = find_task.await.unwrap();
        assert_eq!(result, Ok(Some(doc)));
    }

    #[tokio::test]
    async fn test_unexpected_request_is_none() {
        let (client, mut receiver) = create_mock_client(10);

        tokio::spawn(async move { client.delete_one(Filter::eq("code", "w1")).await });

        assert!(expect_insert_one(&mut receiver).await.is_none());
    }
}
