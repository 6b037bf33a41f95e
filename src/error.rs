use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::data::timetable::Weekday;
use crate::schedule::conflict::Violation;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Cors(#[from] rocket_cors::Error),
}

/// Failures of the persistence layer, independent of which store is used.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Serialize(#[from] bson::ser::Error),
    #[error(transparent)]
    Deserialize(#[from] bson::de::Error),
    #[error("write rejected by unique index: {0}")]
    Duplicate(String),
}

/// Kinds of records an operation can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Day,
    TimeSlot,
    Class,
    Section,
    Subject,
    Teacher,
    Assignment,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Day => write!(f, "day"),
            ReferenceKind::TimeSlot => write!(f, "time slot"),
            ReferenceKind::Class => write!(f, "class"),
            ReferenceKind::Section => write!(f, "section"),
            ReferenceKind::Subject => write!(f, "subject"),
            ReferenceKind::Teacher => write!(f, "teacher"),
            ReferenceKind::Assignment => write!(f, "assignment"),
        }
    }
}

/// Everything that can abort a single operator action.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid '{field}': {detail}")]
    InvalidField { field: &'static str, detail: String },
    #[error("{kind} '{id}' doesn't exist")]
    MissingReference { kind: ReferenceKind, id: Uuid },
    #[error("time slot '{0}' is a break and can't be assigned")]
    BreakSlot(Uuid),
    #[error("{0} already has a class day")]
    DuplicateDay(Weekday),
    #[error(transparent)]
    Rejected(#[from] Violation),
    #[error("another operator changed this slot at the same time")]
    ConcurrentConflict,
    #[error(transparent)]
    Store(StoreError),
}

impl ScheduleError {
    pub fn missing(kind: ReferenceKind, id: Uuid) -> ScheduleError {
        ScheduleError::MissingReference { kind, id }
    }
}

impl From<StoreError> for ScheduleError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(_) => ScheduleError::ConcurrentConflict,
            other => ScheduleError::Store(other),
        }
    }
}
