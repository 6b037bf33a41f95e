use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::timetable::db::{AssignmentData, DayData, SlotData};
use crate::data::timetable::{Assignment, ClassDay, ScheduleEntry, TimeSlot};
use crate::resp::operator::OperatorContext;
use crate::resp::problem::Problem;
use crate::schedule::service;
use crate::store::Backend;

/// List the branch's class days
#[utoipa::path(
    responses(
        (status = 200, description = "Class days, Monday first", body = Vec<ClassDay>),
        (status = 400, description = "Missing operator headers", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[get("/days")]
#[tracing::instrument(skip(backend))]
pub async fn day_list(
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Vec<ClassDay>>, Problem> {
    Ok(Json(service::list_days(backend.inner(), &operator).await?))
}

/// Create a class day
#[utoipa::path(
    request_body = DayData,
    responses(
        (status = 200, description = "Created day", body = ClassDay),
        (status = 409, description = "Weekday already has a day", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[post("/days", format = "application/json", data = "<day>")]
#[tracing::instrument(skip(backend))]
pub async fn day_create(
    day: Json<DayData>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<ClassDay>, Problem> {
    let created = service::create_day(backend.inner(), &operator, day.into_inner()).await?;
    Ok(Json(created))
}

/// List a day's time slots ordered by start time
#[utoipa::path(
    params(
        ("day", description = "class day ID"),
        ("assignable", description = "only return class slots")
    ),
    responses(
        (status = 200, description = "Time slots", body = Vec<TimeSlot>),
        (status = 422, description = "Day doesn't exist in this branch", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[get("/days/<day>/slots?<assignable>")]
#[tracing::instrument(skip(backend))]
pub async fn slot_list(
    day: Uuid,
    assignable: Option<bool>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Vec<TimeSlot>>, Problem> {
    let slots = service::list_slots(
        backend.inner(),
        &operator,
        day,
        assignable.unwrap_or(false),
    )
    .await?;
    Ok(Json(slots))
}

/// Add a time slot to a day
#[utoipa::path(
    request_body = SlotData,
    params(("day", description = "class day ID")),
    responses(
        (status = 200, description = "Created slot", body = TimeSlot),
        (status = 400, description = "Missing or malformed label or kind", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[post("/days/<day>/slots", format = "application/json", data = "<slot>")]
#[tracing::instrument(skip(backend))]
pub async fn slot_create(
    day: Uuid,
    slot: Json<SlotData>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<TimeSlot>, Problem> {
    let created = service::create_slot(backend.inner(), &operator, day, slot.into_inner()).await?;
    Ok(Json(created))
}

/// A day's schedule with breaks, optionally for one section
#[utoipa::path(
    params(
        ("day", description = "class day ID"),
        ("section", description = "only show this section")
    ),
    responses(
        (status = 200, description = "Schedule ordered by slot start", body = Vec<ScheduleEntry>),
        (status = 422, description = "Day doesn't exist in this branch", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[get("/days/<day>/assignments?<section>")]
#[tracing::instrument(skip(backend))]
pub async fn assignment_list(
    day: Uuid,
    section: Option<Uuid>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Vec<ScheduleEntry>>, Problem> {
    let entries = service::day_schedule(backend.inner(), &operator, day, section).await?;
    Ok(Json(entries))
}

/// Assign a teacher to a class slot
#[utoipa::path(
    request_body = AssignmentData,
    params(("day", description = "class day ID")),
    responses(
        (status = 200, description = "Stored assignment", body = Assignment),
        (status = 400, description = "Missing field", body = Problem),
        (status = 409, description = "Double-booking", body = Problem),
        (status = 422, description = "Unknown or unassignable reference", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[post("/days/<day>/assignments", format = "application/json", data = "<assignment>")]
#[tracing::instrument(skip(backend))]
pub async fn assignment_create(
    day: Uuid,
    assignment: Json<AssignmentData>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Assignment>, Problem> {
    let created =
        service::create_assignment(backend.inner(), &operator, day, assignment.into_inner())
            .await?;
    Ok(Json(created))
}

/// Change an assignment
#[utoipa::path(
    request_body = AssignmentData,
    params(("id", description = "assignment ID")),
    responses(
        (status = 200, description = "Updated assignment", body = Assignment),
        (status = 409, description = "Double-booking", body = Problem),
        (status = 422, description = "Unknown assignment or reference", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[put("/assignments/<id>", format = "application/json", data = "<assignment>")]
#[tracing::instrument(skip(backend))]
pub async fn assignment_update(
    id: Uuid,
    assignment: Json<AssignmentData>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Assignment>, Problem> {
    let updated =
        service::update_assignment(backend.inner(), &operator, id, assignment.into_inner())
            .await?;
    Ok(Json(updated))
}

/// Delete an assignment
#[utoipa::path(
    params(("id", description = "assignment ID")),
    responses(
        (status = 200, description = "ID of the removed assignment", body = String),
        (status = 404, description = "Assignment doesn't exist"),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[delete("/assignments/<id>")]
#[tracing::instrument(skip(backend))]
pub async fn assignment_delete(
    id: Uuid,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Option<String>, Problem> {
    let removed = service::delete_assignment(backend.inner(), &operator, id).await?;
    Ok(removed.map(|it| it.id.to_string()))
}
