//! Class-slot scheduling: conflict rules, slot ordering and the operations
//! the scheduling API runs.

pub mod conflict;
pub mod service;
pub mod slot_time;

pub use conflict::{Candidate, Verdict, Violation};
