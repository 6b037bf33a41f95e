use bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use rocket::futures::TryStreamExt;

use super::{id_bson, Query, Record, Store};
use crate::data::timetable::{Assignment, ClassDay};
use crate::error::StoreError;

const DUPLICATE_KEY_CODE: i32 = 11000;

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == DUPLICATE_KEY_CODE
    )
}

fn write_error(e: mongodb::error::Error) -> StoreError {
    if is_duplicate_key(&e) {
        StoreError::Duplicate(e.to_string())
    } else {
        StoreError::Database(e)
    }
}

/// Decodes every document or fails on the first malformed one. Skipping
/// records would hide assignments from the double-booking check.
fn decode_all<R: Record>(documents: Vec<Document>) -> Result<Vec<R>, StoreError> {
    documents
        .into_iter()
        .map(|document| {
            bson::from_document(document).map_err(|e| {
                tracing::error!("Malformed {} document: {}", R::COLLECTION, e);
                StoreError::from(e)
            })
        })
        .collect()
}

impl Store for Database {
    async fn insert<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        self.collection::<Document>(R::COLLECTION)
            .insert_one(bson::to_document(record)?, None)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    async fn find_one<R: Record>(&self, query: Query) -> Result<Option<R>, StoreError> {
        let document = self
            .collection::<Document>(R::COLLECTION)
            .find_one(query.to_document()?, None)
            .await?;

        match document {
            Some(doc) => Ok(Some(bson::from_document(doc)?)),
            None => Ok(None),
        }
    }

    async fn find<R: Record>(&self, query: Query) -> Result<Vec<R>, StoreError> {
        let documents: Vec<Document> = self
            .collection::<Document>(R::COLLECTION)
            .find(query.to_document()?, None)
            .await?
            .try_collect()
            .await?;

        decode_all(documents)
    }

    async fn replace<R: Record>(&self, record: &R) -> Result<bool, StoreError> {
        let id = id_bson(record.id())?;
        let result = self
            .collection::<Document>(R::COLLECTION)
            .replace_one(
                doc! { "_id": id },
                bson::to_document(record)?,
                None,
            )
            .await
            .map_err(write_error)?;

        Ok(result.matched_count > 0)
    }

    async fn delete<R: Record>(&self, query: Query) -> Result<Option<R>, StoreError> {
        let removed = self
            .collection::<Document>(R::COLLECTION)
            .find_one_and_delete(query.to_document()?, None)
            .await?;

        match removed {
            Some(doc) => Ok(Some(bson::from_document(doc)?)),
            None => Ok(None),
        }
    }
}

fn unique_index(name: &str, keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(true)
                .name(name.to_string())
                .build(),
        )
        .build()
}

/// Creates the unique indexes that turn the double-booking checks into hard
/// constraints. Idempotent.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let assignments = db.collection::<Document>(Assignment::COLLECTION);
    assignments
        .create_index(
            unique_index(
                "unique_class_section_slot",
                doc! { "day_id": 1, "time_slot_id": 1, "class_id": 1, "section_id": 1 },
            ),
            None,
        )
        .await?;
    assignments
        .create_index(
            unique_index(
                "unique_teacher_slot",
                doc! { "day_id": 1, "time_slot_id": 1, "teacher_id": 1 },
            ),
            None,
        )
        .await?;

    db.collection::<Document>(ClassDay::COLLECTION)
        .create_index(
            unique_index("unique_branch_weekday", doc! { "branch_id": 1, "weekday": 1 }),
            None,
        )
        .await?;

    tracing::info!("Unique schedule indexes are in place.");
    Ok(())
}
