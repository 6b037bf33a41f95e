use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::conflict::{self, Candidate};
use super::slot_time;
use crate::data::directory::db::find_in_branch;
use crate::data::directory::{Named, SchoolClass, Section, Subject, Teacher};
use crate::data::timetable::db::{AssignmentData, AssignmentInput, DayData, SlotData};
use crate::data::timetable::{Assignment, ClassDay, NamedRef, ScheduleEntry, SlotKind, TimeSlot};
use crate::error::{ReferenceKind, ScheduleError};
use crate::resp::operator::OperatorContext;
use crate::store::{Query, Record, Store};

pub async fn create_day<S: Store>(
    store: &S,
    operator: &OperatorContext,
    data: DayData,
) -> Result<ClassDay, ScheduleError> {
    let weekday = data.validate()?;

    let existing: Vec<ClassDay> = store
        .find(Query::new().eq("branch_id", operator.branch_id))
        .await?;
    if existing.iter().any(|it| it.weekday == weekday) {
        return Err(ScheduleError::DuplicateDay(weekday));
    }

    let day = ClassDay {
        id: Uuid::new_v4(),
        branch_id: operator.branch_id,
        weekday,
        created_by: operator.acting_user_id,
        created_at: Utc::now(),
    };
    store.insert(&day).await?;
    tracing::info!("Created {} class day {}", day.weekday, day.id);
    Ok(day)
}

pub async fn list_days<S: Store>(
    store: &S,
    operator: &OperatorContext,
) -> Result<Vec<ClassDay>, ScheduleError> {
    let mut days: Vec<ClassDay> = store
        .find(Query::new().eq("branch_id", operator.branch_id))
        .await?;
    days.sort_by_key(|it| it.weekday);
    Ok(days)
}

pub async fn create_slot<S: Store>(
    store: &S,
    operator: &OperatorContext,
    day_id: Uuid,
    data: SlotData,
) -> Result<TimeSlot, ScheduleError> {
    let input = data.validate()?;
    let day: ClassDay =
        find_in_branch(store, ReferenceKind::Day, operator.branch_id, day_id).await?;

    let slot = TimeSlot {
        id: Uuid::new_v4(),
        branch_id: operator.branch_id,
        day_id: day.id,
        label: input.label,
        kind: input.kind,
        created_by: operator.acting_user_id,
        created_at: Utc::now(),
    };
    store.insert(&slot).await?;
    Ok(slot)
}

/// Slots of a day ordered by start time. With `assignable_only` break slots
/// are left out.
pub async fn list_slots<S: Store>(
    store: &S,
    operator: &OperatorContext,
    day_id: Uuid,
    assignable_only: bool,
) -> Result<Vec<TimeSlot>, ScheduleError> {
    let _: ClassDay =
        find_in_branch(store, ReferenceKind::Day, operator.branch_id, day_id).await?;

    let mut slots: Vec<TimeSlot> = store.find(Query::new().eq("day_id", day_id)).await?;
    if assignable_only {
        slots.retain(TimeSlot::is_assignable);
    }
    slot_time::sort_by_start(&mut slots, |it| it.label.as_str());
    Ok(slots)
}

/// Makes sure everything the assignment points at exists in the operator's
/// branch and fits together.
async fn resolve_references<S: Store>(
    store: &S,
    operator: &OperatorContext,
    day: &ClassDay,
    input: &AssignmentInput,
) -> Result<(), ScheduleError> {
    let branch = operator.branch_id;

    let slot: TimeSlot =
        find_in_branch(store, ReferenceKind::TimeSlot, branch, input.time_slot_id).await?;
    if slot.day_id != day.id {
        return Err(ScheduleError::missing(ReferenceKind::TimeSlot, slot.id));
    }
    if !slot.is_assignable() {
        return Err(ScheduleError::BreakSlot(slot.id));
    }

    let class: SchoolClass =
        find_in_branch(store, ReferenceKind::Class, branch, input.class_id).await?;

    let section: Section =
        find_in_branch(store, ReferenceKind::Section, branch, input.section_id).await?;
    if section.class_id != class.id {
        return Err(ScheduleError::missing(ReferenceKind::Section, section.id));
    }

    let subject: Subject =
        find_in_branch(store, ReferenceKind::Subject, branch, input.subject_id).await?;
    if subject.class_id != class.id {
        return Err(ScheduleError::missing(ReferenceKind::Subject, subject.id));
    }

    let _: Teacher =
        find_in_branch(store, ReferenceKind::Teacher, branch, input.teacher_id).await?;

    Ok(())
}

async fn ensure_free<S: Store>(
    store: &S,
    day_id: Uuid,
    input: &AssignmentInput,
    exclude: Option<Uuid>,
) -> Result<(), ScheduleError> {
    let existing: Vec<Assignment> = store.find(Query::new().eq("day_id", day_id)).await?;

    let candidate = Candidate {
        time_slot_id: input.time_slot_id,
        class_id: input.class_id,
        section_id: input.section_id,
        teacher_id: input.teacher_id,
        exclude,
    };

    conflict::check(&candidate, &existing)
        .into_result()
        .map_err(|violation| {
            tracing::debug!("Rejected assignment on day {}: {:?}", day_id, violation);
            ScheduleError::Rejected(violation)
        })
}

pub async fn create_assignment<S: Store>(
    store: &S,
    operator: &OperatorContext,
    day_id: Uuid,
    data: AssignmentData,
) -> Result<Assignment, ScheduleError> {
    let input = data.validate()?;
    let day: ClassDay =
        find_in_branch(store, ReferenceKind::Day, operator.branch_id, day_id).await?;
    resolve_references(store, operator, &day, &input).await?;
    ensure_free(store, day.id, &input, None).await?;

    let now = Utc::now();
    let assignment = Assignment {
        id: Uuid::new_v4(),
        branch_id: operator.branch_id,
        day_id: day.id,
        time_slot_id: input.time_slot_id,
        class_id: input.class_id,
        section_id: input.section_id,
        subject_id: input.subject_id,
        teacher_id: input.teacher_id,
        class_type: input.class_type,
        created_by: operator.acting_user_id,
        updated_by: operator.acting_user_id,
        created_at: now,
        updated_at: now,
    };
    store.insert(&assignment).await?;

    tracing::info!(
        "Assigned teacher {} to slot {} on day {}",
        assignment.teacher_id,
        assignment.time_slot_id,
        assignment.day_id
    );
    Ok(assignment)
}

/// Re-validates against the day's assignments without the edited one. The
/// assignment stays on its day.
pub async fn update_assignment<S: Store>(
    store: &S,
    operator: &OperatorContext,
    id: Uuid,
    data: AssignmentData,
) -> Result<Assignment, ScheduleError> {
    let input = data.validate()?;
    let stored: Assignment =
        find_in_branch(store, ReferenceKind::Assignment, operator.branch_id, id).await?;
    let day: ClassDay =
        find_in_branch(store, ReferenceKind::Day, operator.branch_id, stored.day_id).await?;
    resolve_references(store, operator, &day, &input).await?;
    ensure_free(store, day.id, &input, Some(stored.id)).await?;

    let updated = Assignment {
        time_slot_id: input.time_slot_id,
        class_id: input.class_id,
        section_id: input.section_id,
        subject_id: input.subject_id,
        teacher_id: input.teacher_id,
        class_type: input.class_type,
        updated_by: operator.acting_user_id,
        updated_at: Utc::now(),
        ..stored
    };

    if !store.replace(&updated).await? {
        // removed between the read and the write
        return Err(ScheduleError::missing(ReferenceKind::Assignment, id));
    }

    tracing::info!("Updated assignment {}", updated.id);
    Ok(updated)
}

/// Removal can't introduce a conflict, so nothing is validated.
pub async fn delete_assignment<S: Store>(
    store: &S,
    operator: &OperatorContext,
    id: Uuid,
) -> Result<Option<Assignment>, ScheduleError> {
    let removed: Option<Assignment> = store
        .delete(Query::by_id(id).eq("branch_id", operator.branch_id))
        .await?;

    if let Some(it) = &removed {
        tracing::info!("Removed assignment {} by {}", it.id, operator.acting_user_id);
    }
    Ok(removed)
}

async fn names<R: Record + Named, S: Store>(
    store: &S,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, ScheduleError> {
    let mut names = HashMap::new();
    for id in ids {
        if names.contains_key(id) {
            continue;
        }
        let record: Option<R> = store.get(*id).await?;
        if let Some(record) = record {
            names.insert(*id, record.name().to_string());
        }
    }
    Ok(names)
}

fn ids_of(assignments: &[Assignment], field: fn(&Assignment) -> Uuid) -> Vec<Uuid> {
    assignments.iter().map(field).collect()
}

fn named_ref(names: &HashMap<Uuid, String>, id: Uuid) -> NamedRef {
    NamedRef {
        id,
        name: names.get(&id).cloned(),
    }
}

/// A day's schedule: its assignments (optionally of one section) with display
/// names, interleaved with the day's breaks, ordered by start time.
pub async fn day_schedule<S: Store>(
    store: &S,
    operator: &OperatorContext,
    day_id: Uuid,
    section_id: Option<Uuid>,
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    let day: ClassDay =
        find_in_branch(store, ReferenceKind::Day, operator.branch_id, day_id).await?;

    let mut query = Query::new().eq("day_id", day.id);
    if let Some(section) = section_id {
        query = query.eq("section_id", section);
    }
    let assignments: Vec<Assignment> = store.find(query).await?;
    let slots: Vec<TimeSlot> = store.find(Query::new().eq("day_id", day.id)).await?;

    let labels: HashMap<Uuid, &str> = slots
        .iter()
        .map(|it| (it.id, it.label.as_str()))
        .collect();
    let class_ids = ids_of(&assignments, |it| it.class_id);
    let section_ids = ids_of(&assignments, |it| it.section_id);
    let subject_ids = ids_of(&assignments, |it| it.subject_id);
    let teacher_ids = ids_of(&assignments, |it| it.teacher_id);
    let classes = names::<SchoolClass, _>(store, &class_ids).await?;
    let sections = names::<Section, _>(store, &section_ids).await?;
    let subjects = names::<Subject, _>(store, &subject_ids).await?;
    let teachers = names::<Teacher, _>(store, &teacher_ids).await?;

    let mut entries: Vec<ScheduleEntry> = assignments
        .iter()
        .map(|it| ScheduleEntry::Class {
            assignment_id: it.id,
            time_slot_id: it.time_slot_id,
            label: labels.get(&it.time_slot_id).map(|l| l.to_string()),
            class_type: it.class_type,
            class: named_ref(&classes, it.class_id),
            section: named_ref(&sections, it.section_id),
            subject: named_ref(&subjects, it.subject_id),
            teacher: named_ref(&teachers, it.teacher_id),
        })
        .collect();

    entries.extend(
        slots
            .iter()
            .filter(|it| it.kind == SlotKind::BreakSlot)
            .map(|it| ScheduleEntry::Break {
                time_slot_id: it.id,
                label: it.label.clone(),
            }),
    );

    slot_time::sort_by_start(&mut entries, ScheduleEntry::label);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::directory::db::{
        ClassData, DirectoryDbExt, SectionData, SubjectData, TeacherData,
    };
    use crate::data::timetable::{ClassType, Weekday};
    use crate::schedule::Violation;
    use crate::store::MemoryStore;

    struct School {
        store: MemoryStore,
        op: OperatorContext,
        day: ClassDay,
        first: TimeSlot,
        second: TimeSlot,
        recess: TimeSlot,
        class: SchoolClass,
        sec_a: Section,
        sec_b: Section,
        maths: Subject,
        t1: Teacher,
        t2: Teacher,
    }

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    async fn school() -> School {
        let store = MemoryStore::default();
        let op = OperatorContext {
            branch_id: Uuid::new_v4(),
            acting_user_id: Uuid::new_v4(),
        };

        let day = create_day(
            &store,
            &op,
            DayData {
                weekday: Some(Weekday::Monday),
            },
        )
        .await
        .unwrap();

        let slot = |label: &str, kind: SlotKind| {
            create_slot(
                &store,
                &op,
                day.id,
                SlotData {
                    label: text(label),
                    kind: Some(kind),
                },
            )
        };
        let second = slot("9:45 AM to 10:30 AM", SlotKind::ClassSlot).await.unwrap();
        let recess = slot("10:30 AM to 11:00 AM", SlotKind::BreakSlot).await.unwrap();
        let first = slot("9:00 AM to 9:45 AM", SlotKind::ClassSlot).await.unwrap();

        let class = store
            .create_class(&op, ClassData { name: text("Grade 7") })
            .await
            .unwrap();
        let section = |name: &str| SectionData {
            class_id: Some(class.id),
            name: text(name),
        };
        let sec_a = store.create_section(&op, section("A")).await.unwrap();
        let sec_b = store.create_section(&op, section("B")).await.unwrap();
        let maths = store
            .create_subject(
                &op,
                SubjectData {
                    class_id: Some(class.id),
                    name: text("Mathematics"),
                },
            )
            .await
            .unwrap();
        let t1 = store
            .create_teacher(&op, TeacherData { name: text("Ayesha") })
            .await
            .unwrap();
        let t2 = store
            .create_teacher(&op, TeacherData { name: text("Bilal") })
            .await
            .unwrap();

        School {
            store,
            op,
            day,
            first,
            second,
            recess,
            class,
            sec_a,
            sec_b,
            maths,
            t1,
            t2,
        }
    }

    impl School {
        fn data(&self, slot: &TimeSlot, section: &Section, teacher: &Teacher) -> AssignmentData {
            AssignmentData {
                time_slot_id: Some(slot.id),
                class_id: Some(self.class.id),
                section_id: Some(section.id),
                subject_id: Some(self.maths.id),
                teacher_id: Some(teacher.id),
                class_type: None,
            }
        }

        async fn assign(
            &self,
            slot: &TimeSlot,
            section: &Section,
            teacher: &Teacher,
        ) -> Result<Assignment, ScheduleError> {
            create_assignment(
                &self.store,
                &self.op,
                self.day.id,
                self.data(slot, section, teacher),
            )
            .await
        }
    }

    #[rocket::async_test]
    async fn day_scenario_through_the_store() {
        let s = school().await;

        let stored = s.assign(&s.first, &s.sec_a, &s.t1).await.unwrap();
        assert_eq!(stored.class_type, ClassType::MainClass);
        assert_eq!(stored.created_by, s.op.acting_user_id);

        assert!(matches!(
            s.assign(&s.first, &s.sec_b, &s.t1).await,
            Err(ScheduleError::Rejected(Violation::DuplicateTeacherClassSlot))
        ));
        assert!(matches!(
            s.assign(&s.first, &s.sec_a, &s.t2).await,
            Err(ScheduleError::Rejected(Violation::DuplicateClassSlot))
        ));
        s.assign(&s.second, &s.sec_a, &s.t1).await.unwrap();

        let all: Vec<Assignment> = s
            .store
            .find(Query::new().eq("day_id", s.day.id))
            .await
            .unwrap();
        assert_eq!(all.len(), 2, "rejected candidates must not be stored");
    }

    #[rocket::async_test]
    async fn update_may_keep_its_own_slot() {
        let s = school().await;
        let stored = s.assign(&s.first, &s.sec_a, &s.t1).await.unwrap();
        s.assign(&s.second, &s.sec_b, &s.t2).await.unwrap();

        let data = s.data(&s.first, &s.sec_a, &s.t2);
        let edit = update_assignment(&s.store, &s.op, stored.id, data)
            .await
            .unwrap();
        assert_eq!(edit.teacher_id, s.t2.id);
        assert_eq!(edit.created_at, stored.created_at);

        let data = s.data(&s.second, &s.sec_b, &s.t1);
        let clash = update_assignment(&s.store, &s.op, stored.id, data).await;
        assert!(matches!(
            clash,
            Err(ScheduleError::Rejected(Violation::DuplicateClassSlot))
        ));
    }

    #[rocket::async_test]
    async fn breaks_cannot_be_assigned() {
        let s = school().await;
        assert!(matches!(
            s.assign(&s.recess, &s.sec_a, &s.t1).await,
            Err(ScheduleError::BreakSlot(id)) if id == s.recess.id
        ));
    }

    #[rocket::async_test]
    async fn unknown_references_abort_before_validation() {
        let s = school().await;
        let mut data = s.data(&s.first, &s.sec_a, &s.t1);
        let ghost = Uuid::new_v4();
        data.teacher_id = Some(ghost);

        let result = create_assignment(&s.store, &s.op, s.day.id, data).await;
        assert!(matches!(
            result,
            Err(ScheduleError::MissingReference {
                kind: ReferenceKind::Teacher,
                id,
            }) if id == ghost
        ));

        let other_branch = OperatorContext {
            branch_id: Uuid::new_v4(),
            acting_user_id: s.op.acting_user_id,
        };
        let result = create_assignment(
            &s.store,
            &other_branch,
            s.day.id,
            s.data(&s.first, &s.sec_a, &s.t1),
        )
        .await;
        assert!(matches!(
            result,
            Err(ScheduleError::MissingReference {
                kind: ReferenceKind::Day,
                ..
            })
        ));
    }

    #[rocket::async_test]
    async fn section_must_belong_to_class() {
        let s = school().await;
        let other = s
            .store
            .create_class(&s.op, ClassData { name: text("Grade 8") })
            .await
            .unwrap();
        let foreign = s
            .store
            .create_section(
                &s.op,
                SectionData {
                    class_id: Some(other.id),
                    name: text("A"),
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            s.assign(&s.first, &foreign, &s.t1).await,
            Err(ScheduleError::MissingReference {
                kind: ReferenceKind::Section,
                ..
            })
        ));
    }

    #[rocket::async_test]
    async fn delete_is_unconditional_and_scoped() {
        let s = school().await;
        let stored = s.assign(&s.first, &s.sec_a, &s.t1).await.unwrap();

        let stranger = OperatorContext {
            branch_id: Uuid::new_v4(),
            acting_user_id: Uuid::new_v4(),
        };
        assert!(delete_assignment(&s.store, &stranger, stored.id)
            .await
            .unwrap()
            .is_none());

        let removed = delete_assignment(&s.store, &s.op, stored.id).await.unwrap();
        assert_eq!(removed.map(|it| it.id), Some(stored.id));
        assert!(delete_assignment(&s.store, &s.op, stored.id)
            .await
            .unwrap()
            .is_none());

        // the slot is free again
        s.assign(&s.first, &s.sec_a, &s.t2).await.unwrap();
    }

    #[rocket::async_test]
    async fn duplicate_weekday_is_refused() {
        let s = school().await;
        let again = create_day(
            &s.store,
            &s.op,
            DayData {
                weekday: Some(Weekday::Monday),
            },
        )
        .await;
        assert!(matches!(again, Err(ScheduleError::DuplicateDay(Weekday::Monday))));

        create_day(
            &s.store,
            &s.op,
            DayData {
                weekday: Some(Weekday::Friday),
            },
        )
        .await
        .unwrap();
        let days = list_days(&s.store, &s.op).await.unwrap();
        let weekdays: Vec<_> = days.iter().map(|it| it.weekday).collect();
        assert_eq!(weekdays, vec![Weekday::Monday, Weekday::Friday]);
    }

    #[rocket::async_test]
    async fn slots_are_listed_by_start_time() {
        let s = school().await;

        let all = list_slots(&s.store, &s.op, s.day.id, false).await.unwrap();
        let ids: Vec<_> = all.iter().map(|it| it.id).collect();
        assert_eq!(ids, vec![s.first.id, s.second.id, s.recess.id]);

        let assignable = list_slots(&s.store, &s.op, s.day.id, true).await.unwrap();
        assert!(assignable.iter().all(TimeSlot::is_assignable));
        assert_eq!(assignable.len(), 2);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn schedule_future_can_run_in_a_handler() {
        let backend = crate::store::Backend::memory();
        let op = OperatorContext {
            branch_id: Uuid::new_v4(),
            acting_user_id: Uuid::new_v4(),
        };
        let listing = day_schedule(&backend, &op, Uuid::new_v4(), None);
        assert_send(&listing);
    }

    #[rocket::async_test]
    async fn schedule_interleaves_breaks() {
        let s = school().await;
        s.assign(&s.second, &s.sec_a, &s.t1).await.unwrap();
        s.assign(&s.first, &s.sec_b, &s.t1).await.unwrap();

        let schedule = day_schedule(&s.store, &s.op, s.day.id, None).await.unwrap();
        let labels: Vec<_> = schedule.iter().map(|it| it.label().to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "9:00 AM to 9:45 AM",
                "9:45 AM to 10:30 AM",
                "10:30 AM to 11:00 AM"
            ]
        );

        match &schedule[0] {
            ScheduleEntry::Class {
                section, teacher, ..
            } => {
                assert_eq!(section.name.as_deref(), Some("B"));
                assert_eq!(teacher.name.as_deref(), Some("Ayesha"));
            }
            other => panic!("expected a class entry, got {:?}", other),
        }
        assert!(matches!(schedule[2], ScheduleEntry::Break { .. }));

        let only_a = day_schedule(&s.store, &s.op, s.day.id, Some(s.sec_a.id))
            .await
            .unwrap();
        assert_eq!(only_a.len(), 2, "one class plus the break");
    }
}
