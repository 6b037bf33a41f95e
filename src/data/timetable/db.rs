use super::{ClassType, SlotKind, Weekday};

use crate::error::ScheduleError;
use crate::schedule::slot_time;
use crate::util::{required, required_text};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DayData {
    pub weekday: Option<Weekday>,
}

impl DayData {
    pub fn validate(self) -> Result<Weekday, ScheduleError> {
        required(self.weekday, "weekday")
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SlotData {
    /// `H:MM AM/PM to H:MM AM/PM`
    pub label: Option<String>,
    pub kind: Option<SlotKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotInput {
    pub label: String,
    pub kind: SlotKind,
}

impl SlotData {
    pub fn validate(self) -> Result<SlotInput, ScheduleError> {
        let label = required_text(self.label, "label")?;
        let kind = required(self.kind, "kind")?;

        match slot_time::parse_label(&label) {
            Some((start, end)) if start < end => Ok(SlotInput { label, kind }),
            Some(_) => Err(ScheduleError::InvalidField {
                field: "label",
                detail: "slot must end after it starts".to_string(),
            }),
            None => Err(ScheduleError::InvalidField {
                field: "label",
                detail: "expected 'H:MM AM to H:MM PM'".to_string(),
            }),
        }
    }
}

/// Assignment payload as sent by the scheduling form.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AssignmentData {
    pub time_slot_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    #[serde(default)]
    pub class_type: Option<ClassType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentInput {
    pub time_slot_id: Uuid,
    pub class_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub teacher_id: Uuid,
    pub class_type: ClassType,
}

impl AssignmentData {
    pub fn validate(self) -> Result<AssignmentInput, ScheduleError> {
        Ok(AssignmentInput {
            time_slot_id: required(self.time_slot_id, "time_slot_id")?,
            class_id: required(self.class_id, "class_id")?,
            section_id: required(self.section_id, "section_id")?,
            subject_id: required(self.subject_id, "subject_id")?,
            teacher_id: required(self.teacher_id, "teacher_id")?,
            class_type: self.class_type.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> AssignmentData {
        AssignmentData {
            time_slot_id: Some(Uuid::new_v4()),
            class_id: Some(Uuid::new_v4()),
            section_id: Some(Uuid::new_v4()),
            subject_id: Some(Uuid::new_v4()),
            teacher_id: Some(Uuid::new_v4()),
            class_type: None,
        }
    }

    #[test]
    fn assignment_defaults_to_main_class() {
        let input = full().validate().expect("complete payload");
        assert_eq!(input.class_type, ClassType::MainClass);
    }

    #[test]
    fn assignment_reports_first_missing_field() {
        let mut data = full();
        data.section_id = None;
        data.teacher_id = None;

        assert!(matches!(
            data.validate(),
            Err(ScheduleError::MissingField("section_id"))
        ));
    }

    #[test]
    fn assignment_payload_parses_from_json() {
        let teacher = Uuid::new_v4();
        let data: AssignmentData = serde_json::from_value(serde_json::json!({
            "teacher_id": teacher,
            "class_type": "SubjectClass",
        }))
        .expect("valid json");

        assert_eq!(data.teacher_id, Some(teacher));
        assert_eq!(data.class_type, Some(ClassType::SubjectClass));
        assert!(matches!(
            data.validate(),
            Err(ScheduleError::MissingField("time_slot_id"))
        ));
    }

    #[test]
    fn slot_label_must_parse() {
        let bad = SlotData {
            label: Some("after lunch".to_string()),
            kind: Some(SlotKind::ClassSlot),
        };
        assert!(matches!(
            bad.validate(),
            Err(ScheduleError::InvalidField { field: "label", .. })
        ));

        let backwards = SlotData {
            label: Some("10:00 AM to 9:15 AM".to_string()),
            kind: Some(SlotKind::ClassSlot),
        };
        assert!(matches!(
            backwards.validate(),
            Err(ScheduleError::InvalidField { field: "label", .. })
        ));

        let good = SlotData {
            label: Some("  9:00 AM to 9:45 AM ".to_string()),
            kind: Some(SlotKind::BreakSlot),
        };
        assert_eq!(
            good.validate().unwrap(),
            SlotInput {
                label: "9:00 AM to 9:45 AM".to_string(),
                kind: SlotKind::BreakSlot
            }
        );
    }

    #[test]
    fn day_requires_weekday() {
        assert!(matches!(
            DayData::default().validate(),
            Err(ScheduleError::MissingField("weekday"))
        ));
    }
}
