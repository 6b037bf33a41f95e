//! Record persistence.
//!
//! Every collection stores plain serde structs keyed by `_id`. Lookups are
//! conjunctions of id-valued field equalities, which is all the scheduling
//! and directory queries need. [`Backend`] picks the implementation at
//! startup.

use bson::{Bson, Document};
use mongodb::Database;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;

/// A document living in its own collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

/// Equality filter over id-valued fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    fields: Vec<(&'static str, Uuid)>,
}

impl Query {
    pub fn new() -> Query {
        Query::default()
    }

    pub fn by_id(id: Uuid) -> Query {
        Query::new().eq("_id", id)
    }

    pub fn eq(mut self, field: &'static str, value: Uuid) -> Query {
        self.fields.push((field, value));
        self
    }

    pub fn to_document(&self) -> Result<Document, StoreError> {
        let mut document = Document::new();
        for (field, value) in &self.fields {
            document.insert(*field, id_bson(*value)?);
        }
        Ok(document)
    }

    /// Whether `document` satisfies every equality.
    pub fn matches(&self, document: &Document) -> Result<bool, StoreError> {
        for (field, value) in &self.fields {
            if document.get(*field) != Some(&id_bson(*value)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Encodes an id exactly the way record serialization does, so filters
/// compare equal to stored fields.
#[inline]
pub fn id_bson(id: Uuid) -> Result<Bson, StoreError> {
    Ok(bson::to_bson(&id)?)
}

#[allow(async_fn_in_trait)]
pub trait Store {
    async fn insert<R: Record>(&self, record: &R) -> Result<(), StoreError>;

    async fn find_one<R: Record>(&self, query: Query) -> Result<Option<R>, StoreError>;

    async fn find<R: Record>(&self, query: Query) -> Result<Vec<R>, StoreError>;

    /// Replaces the record with the same id. Returns `false` if none existed.
    async fn replace<R: Record>(&self, record: &R) -> Result<bool, StoreError>;

    /// Removes the first record matching `query` and returns it.
    async fn delete<R: Record>(&self, query: Query) -> Result<Option<R>, StoreError>;

    async fn get<R: Record>(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        self.find_one(Query::by_id(id)).await
    }
}

/// Store selected by configuration.
#[derive(Debug)]
pub enum Backend {
    Mongo(Database),
    Memory(MemoryStore),
}

impl Backend {
    pub fn memory() -> Backend {
        Backend::Memory(MemoryStore::default())
    }
}

impl Store for Backend {
    async fn insert<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        match self {
            Backend::Mongo(db) => db.insert(record).await,
            Backend::Memory(mem) => mem.insert(record).await,
        }
    }

    async fn find_one<R: Record>(&self, query: Query) -> Result<Option<R>, StoreError> {
        match self {
            Backend::Mongo(db) => db.find_one(query).await,
            Backend::Memory(mem) => mem.find_one(query).await,
        }
    }

    async fn find<R: Record>(&self, query: Query) -> Result<Vec<R>, StoreError> {
        match self {
            Backend::Mongo(db) => db.find(query).await,
            Backend::Memory(mem) => mem.find(query).await,
        }
    }

    async fn replace<R: Record>(&self, record: &R) -> Result<bool, StoreError> {
        match self {
            Backend::Mongo(db) => db.replace(record).await,
            Backend::Memory(mem) => mem.replace(record).await,
        }
    }

    async fn delete<R: Record>(&self, query: Query) -> Result<Option<R>, StoreError> {
        match self {
            Backend::Mongo(db) => db.delete(query).await,
            Backend::Memory(mem) => mem.delete(query).await,
        }
    }
}
