use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::Record;

pub mod db;

pub const CLASS_COLLECTION_NAME: &str = "classes";
pub const SECTION_COLLECTION_NAME: &str = "classes.sections";
pub const SUBJECT_COLLECTION_NAME: &str = "classes.subjects";
pub const TEACHER_COLLECTION_NAME: &str = "staff.teachers";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SchoolClass {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Section {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub class_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Subject {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub class_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Teacher {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
}

macro_rules! record {
    ($ty: ty, $collection: expr) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

record!(SchoolClass, CLASS_COLLECTION_NAME);
record!(Section, SECTION_COLLECTION_NAME);
record!(Subject, SUBJECT_COLLECTION_NAME);
record!(Teacher, TEACHER_COLLECTION_NAME);

/// Records with a display name, used when rendering schedules.
pub trait Named {
    fn name(&self) -> &str;
}

macro_rules! named {
    ($($ty: ty),*) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

named!(SchoolClass, Section, Subject, Teacher);
