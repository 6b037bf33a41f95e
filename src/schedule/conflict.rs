//! Double-booking rules for class-slot assignments.
//!
//! A candidate assignment is compared against the assignments already
//! stored for the same day. Rules are checked in a fixed order and the first
//! one that matches decides the reason shown to the operator:
//!
//! 1. the class section already has something in that slot,
//! 2. the teacher already teaches that class in that slot,
//! 3. the teacher is already somewhere else in that slot.
//!
//! The check is a pure function; fetching the day's assignments and
//! persisting the result is up to the caller.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::timetable::Assignment;

/// The slot, class, section and teacher a new or edited assignment wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub time_slot_id: Uuid,
    pub class_id: Uuid,
    pub section_id: Uuid,
    pub teacher_id: Uuid,
    /// Assignment being edited; it never conflicts with itself.
    pub exclude: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error, ToSchema)]
pub enum Violation {
    #[error("This class section already has a class in the selected time slot.")]
    DuplicateClassSlot,
    #[error("This teacher is already assigned to this class in the selected time slot.")]
    DuplicateTeacherClassSlot,
    #[error("This teacher is already assigned to another class in the selected time slot.")]
    TeacherDoubleBooked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Violation),
}

impl Verdict {
    pub fn into_result(self) -> Result<(), Violation> {
        match self {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected(violation) => Err(violation),
        }
    }
}

impl Candidate {
    fn competes_with(&self, other: &Assignment) -> bool {
        self.exclude != Some(other.id) && other.time_slot_id == self.time_slot_id
    }
}

/// Decides whether `candidate` may be stored next to `existing`.
///
/// `existing` must hold the assignments of the candidate's day.
pub fn check(candidate: &Candidate, existing: &[Assignment]) -> Verdict {
    let rivals: Vec<&Assignment> = existing
        .iter()
        .filter(|it| candidate.competes_with(it))
        .collect();

    if rivals
        .iter()
        .any(|it| it.class_id == candidate.class_id && it.section_id == candidate.section_id)
    {
        return Verdict::Rejected(Violation::DuplicateClassSlot);
    }

    if rivals
        .iter()
        .any(|it| it.class_id == candidate.class_id && it.teacher_id == candidate.teacher_id)
    {
        return Verdict::Rejected(Violation::DuplicateTeacherClassSlot);
    }

    if rivals.iter().any(|it| it.teacher_id == candidate.teacher_id) {
        return Verdict::Rejected(Violation::TeacherDoubleBooked);
    }

    Verdict::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::timetable::ClassType;
    use chrono::Utc;

    struct Ids {
        s1: Uuid,
        s2: Uuid,
        c1: Uuid,
        c2: Uuid,
        sec_a: Uuid,
        sec_b: Uuid,
        t1: Uuid,
        t2: Uuid,
    }

    fn ids() -> Ids {
        Ids {
            s1: Uuid::new_v4(),
            s2: Uuid::new_v4(),
            c1: Uuid::new_v4(),
            c2: Uuid::new_v4(),
            sec_a: Uuid::new_v4(),
            sec_b: Uuid::new_v4(),
            t1: Uuid::new_v4(),
            t2: Uuid::new_v4(),
        }
    }

    fn assignment(slot: Uuid, class: Uuid, section: Uuid, teacher: Uuid) -> Assignment {
        let user = Uuid::new_v4();
        Assignment {
            id: Uuid::new_v4(),
            branch_id: Uuid::nil(),
            day_id: Uuid::nil(),
            time_slot_id: slot,
            class_id: class,
            section_id: section,
            subject_id: Uuid::new_v4(),
            teacher_id: teacher,
            class_type: ClassType::MainClass,
            created_by: user,
            updated_by: user,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn candidate(slot: Uuid, class: Uuid, section: Uuid, teacher: Uuid) -> Candidate {
        Candidate {
            time_slot_id: slot,
            class_id: class,
            section_id: section,
            teacher_id: teacher,
            exclude: None,
        }
    }

    #[test]
    fn empty_day_accepts_anything() {
        let i = ids();
        assert_eq!(
            check(&candidate(i.s1, i.c1, i.sec_a, i.t1), &[]),
            Verdict::Accepted
        );
    }

    #[test]
    fn disjoint_tuples_are_accepted() {
        let i = ids();
        let existing = vec![
            assignment(i.s1, i.c1, i.sec_a, i.t1),
            assignment(i.s2, i.c2, i.sec_b, i.t2),
        ];

        // same slot, different class section and teacher
        assert_eq!(
            check(&candidate(i.s1, i.c2, i.sec_b, i.t2), &existing),
            Verdict::Accepted
        );
        // same teacher, class and section, different slot
        assert_eq!(
            check(&candidate(i.s2, i.c1, i.sec_a, i.t1), &existing),
            Verdict::Accepted
        );
    }

    #[test]
    fn class_section_cannot_be_booked_twice() {
        let i = ids();
        let existing = vec![assignment(i.s1, i.c1, i.sec_a, i.t1)];

        assert_eq!(
            check(&candidate(i.s1, i.c1, i.sec_a, i.t2), &existing),
            Verdict::Rejected(Violation::DuplicateClassSlot)
        );
    }

    #[test]
    fn same_section_name_in_other_class_is_fine() {
        let i = ids();
        let existing = vec![assignment(i.s1, i.c1, i.sec_a, i.t1)];

        assert_eq!(
            check(&candidate(i.s1, i.c2, i.sec_a, i.t2), &existing),
            Verdict::Accepted
        );
    }

    #[test]
    fn teacher_cannot_take_two_sections_of_a_class() {
        let i = ids();
        let existing = vec![assignment(i.s1, i.c1, i.sec_a, i.t1)];

        assert_eq!(
            check(&candidate(i.s1, i.c1, i.sec_b, i.t1), &existing),
            Verdict::Rejected(Violation::DuplicateTeacherClassSlot)
        );
    }

    #[test]
    fn teacher_cannot_be_in_two_classes_at_once() {
        let i = ids();
        let existing = vec![assignment(i.s1, i.c1, i.sec_a, i.t1)];

        assert_eq!(
            check(&candidate(i.s1, i.c2, i.sec_b, i.t1), &existing),
            Verdict::Rejected(Violation::TeacherDoubleBooked)
        );
    }

    #[test]
    fn class_slot_rule_wins_over_teacher_rules() {
        let i = ids();
        let existing = vec![
            assignment(i.s1, i.c1, i.sec_a, i.t2),
            assignment(i.s1, i.c2, i.sec_b, i.t1),
        ];

        assert_eq!(
            check(&candidate(i.s1, i.c1, i.sec_a, i.t1), &existing),
            Verdict::Rejected(Violation::DuplicateClassSlot)
        );
    }

    #[test]
    fn edited_assignment_does_not_conflict_with_itself() {
        let i = ids();
        let stored = assignment(i.s1, i.c1, i.sec_a, i.t1);
        let existing = vec![stored.clone(), assignment(i.s2, i.c1, i.sec_a, i.t2)];

        let mut edit = candidate(i.s1, i.c1, i.sec_a, i.t1);
        assert_eq!(
            check(&edit, &existing),
            Verdict::Rejected(Violation::DuplicateClassSlot)
        );

        edit.exclude = Some(stored.id);
        assert_eq!(check(&edit, &existing), Verdict::Accepted);

        // moving into a slot held by someone else still conflicts
        edit.time_slot_id = i.s2;
        assert_eq!(
            check(&edit, &existing),
            Verdict::Rejected(Violation::DuplicateClassSlot)
        );
    }

    #[test]
    fn day_scenario() {
        let i = ids();
        let existing = vec![assignment(i.s1, i.c1, i.sec_a, i.t1)];

        assert_eq!(
            check(&candidate(i.s1, i.c1, i.sec_b, i.t1), &existing).into_result(),
            Err(Violation::DuplicateTeacherClassSlot)
        );
        assert_eq!(
            check(&candidate(i.s1, i.c1, i.sec_a, i.t2), &existing).into_result(),
            Err(Violation::DuplicateClassSlot)
        );
        assert_eq!(
            check(&candidate(i.s2, i.c1, i.sec_a, i.t1), &existing).into_result(),
            Ok(())
        );
    }
}
