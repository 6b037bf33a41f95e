use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::Record;

pub mod db;

pub const DAY_COLLECTION_NAME: &str = "class.days";
pub const TIME_SLOT_COLLECTION_NAME: &str = "class.days.slots";
pub const ASSIGNMENT_COLLECTION_NAME: &str = "class.assignments";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A branch's teaching day. Owns the slots and assignments for that weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClassDay {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub weekday: Weekday,
    pub created_by: Uuid,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Record for ClassDay {
    const COLLECTION: &'static str = DAY_COLLECTION_NAME;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SlotKind {
    ClassSlot,
    BreakSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub day_id: Uuid,
    /// Displayed interval, e.g. `9:00 AM to 9:45 AM`.
    pub label: String,
    pub kind: SlotKind,
    pub created_by: Uuid,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn is_assignable(&self) -> bool {
        self.kind == SlotKind::ClassSlot
    }
}

impl Record for TimeSlot {
    const COLLECTION: &'static str = TIME_SLOT_COLLECTION_NAME;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ClassType {
    #[default]
    MainClass,
    SubjectClass,
}

/// A teacher teaching a subject to one class section in one slot of a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub day_id: Uuid,
    pub time_slot_id: Uuid,
    pub class_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub teacher_id: Uuid,
    #[serde(default)]
    pub class_type: ClassType,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Record for Assignment {
    const COLLECTION: &'static str = ASSIGNMENT_COLLECTION_NAME;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Display name of a referenced record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NamedRef {
    pub id: Uuid,
    /// `None` when the record was removed after the assignment was made.
    pub name: Option<String>,
}

/// One row of a day's schedule as shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind")]
pub enum ScheduleEntry {
    Class {
        assignment_id: Uuid,
        time_slot_id: Uuid,
        label: Option<String>,
        class_type: ClassType,
        class: NamedRef,
        section: NamedRef,
        subject: NamedRef,
        teacher: NamedRef,
    },
    Break {
        time_slot_id: Uuid,
        label: String,
    },
}

impl ScheduleEntry {
    pub fn label(&self) -> &str {
        match self {
            ScheduleEntry::Class { label, .. } => label.as_deref().unwrap_or(""),
            ScheduleEntry::Break { label, .. } => label,
        }
    }
}
