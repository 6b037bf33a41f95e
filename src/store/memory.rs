use std::collections::HashMap;

use bson::Document;
use tokio::sync::RwLock;

use super::{Query, Record, Store};
use crate::error::StoreError;

/// Process-local store keeping serialized documents per collection.
///
/// Records go through the same BSON encoding as the MongoDB store so queries
/// behave identically. Unique indexes are not emulated; the validator is the
/// only double-booking guard here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Vec<Document>>>,
}

impl Store for MemoryStore {
    async fn insert<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let document = bson::to_document(record)?;
        self.collections
            .write()
            .await
            .entry(R::COLLECTION)
            .or_default()
            .push(document);
        Ok(())
    }

    async fn find_one<R: Record>(&self, query: Query) -> Result<Option<R>, StoreError> {
        let collections = self.collections.read().await;
        let documents = match collections.get(R::COLLECTION) {
            Some(it) => it,
            None => return Ok(None),
        };

        for document in documents {
            if query.matches(document)? {
                return Ok(Some(bson::from_document(document.clone())?));
            }
        }
        Ok(None)
    }

    async fn find<R: Record>(&self, query: Query) -> Result<Vec<R>, StoreError> {
        let collections = self.collections.read().await;
        let mut records = vec![];

        for document in collections.get(R::COLLECTION).into_iter().flatten() {
            if query.matches(document)? {
                records.push(bson::from_document(document.clone())?);
            }
        }
        Ok(records)
    }

    async fn replace<R: Record>(&self, record: &R) -> Result<bool, StoreError> {
        let by_id = Query::by_id(record.id());
        let replacement = bson::to_document(record)?;

        let mut collections = self.collections.write().await;
        let documents = collections.entry(R::COLLECTION).or_default();
        for document in documents.iter_mut() {
            if by_id.matches(document)? {
                *document = replacement;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn delete<R: Record>(&self, query: Query) -> Result<Option<R>, StoreError> {
        let mut collections = self.collections.write().await;
        let documents = match collections.get_mut(R::COLLECTION) {
            Some(it) => it,
            None => return Ok(None),
        };

        let mut position = None;
        for (i, document) in documents.iter().enumerate() {
            if query.matches(document)? {
                position = Some(i);
                break;
            }
        }

        match position {
            Some(i) => Ok(Some(bson::from_document(documents.remove(i))?)),
            None => Ok(None),
        }
    }
}
