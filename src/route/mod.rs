use std::collections::BTreeMap;

use rocket::{Build, Rocket, Route};

pub mod directory;
pub mod timetable;

use directory::*;
use timetable::*;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    data::{
        directory::{self as dir, db as dir_db},
        timetable::{self as tt, db as tt_db},
    },
    resp::{operator::doc::OperatorHeaders, problem::Problem},
    schedule::Violation,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        class_list,
        class_create,
        section_list,
        section_create,
        subject_list,
        subject_create,
        teacher_list,
        teacher_create,
        day_list,
        day_create,
        slot_list,
        slot_create,
        assignment_list,
        assignment_create,
        assignment_update,
        assignment_delete
    ),
    components(schemas(
        dir::SchoolClass,
        dir::Section,
        dir::Subject,
        dir::Teacher,
        dir_db::ClassData,
        dir_db::SectionData,
        dir_db::SubjectData,
        dir_db::TeacherData,
        tt::Weekday,
        tt::ClassDay,
        tt::SlotKind,
        tt::TimeSlot,
        tt::ClassType,
        tt::Assignment,
        tt::NamedRef,
        tt::ScheduleEntry,
        tt_db::DayData,
        tt_db::SlotData,
        tt_db::AssignmentData,
        Violation,
        Problem
    )),
    modifiers(&OperatorHeaders, &V1_PREFIX)
)]
pub struct ApiDocV1;

pub struct PathPrefix(pub &'static str);
static V1_PREFIX: PathPrefix = PathPrefix("/api/v1");

impl utoipa::Modify for PathPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut new_paths = BTreeMap::new();

        for (path, item) in std::mem::take(&mut openapi.paths.paths) {
            new_paths.insert(self.0.to_string() + path.as_ref(), item);
        }

        openapi.paths.paths = new_paths;
    }
}

pub fn api_v1() -> Vec<Route> {
    routes![
        class_list,
        class_create,
        section_list,
        section_create,
        subject_list,
        subject_create,
        teacher_list,
        teacher_create,
        day_list,
        day_create,
        slot_list,
        slot_create,
        assignment_list,
        assignment_create,
        assignment_update,
        assignment_delete
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api/v1", api_v1()).mount(
        "/",
        SwaggerUi::new("/swagger/<_..>").url("/api/v1/openapi.json", ApiDocV1::openapi()),
    )
}
