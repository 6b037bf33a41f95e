use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::directory::db::{
    ClassData, DirectoryDbExt, SectionData, SubjectData, TeacherData,
};
use crate::data::directory::{SchoolClass, Section, Subject, Teacher};
use crate::resp::operator::OperatorContext;
use crate::resp::problem::Problem;
use crate::store::Backend;

/// List classes of the branch
#[utoipa::path(
    responses(
        (status = 200, description = "Classes sorted by name", body = Vec<SchoolClass>),
        (status = 400, description = "Missing operator headers", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[get("/classes")]
#[tracing::instrument(skip(backend))]
pub async fn class_list(
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Vec<SchoolClass>>, Problem> {
    Ok(Json(backend.list_classes(&operator).await?))
}

#[utoipa::path(
    request_body = ClassData,
    responses(
        (status = 200, description = "Created class", body = SchoolClass),
        (status = 400, description = "Blank name", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[post("/classes", format = "application/json", data = "<class>")]
#[tracing::instrument(skip(backend))]
pub async fn class_create(
    class: Json<ClassData>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<SchoolClass>, Problem> {
    Ok(Json(backend.create_class(&operator, class.into_inner()).await?))
}

/// Sections of a class
#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Sections sorted by name", body = Vec<Section>),
        (status = 422, description = "Class doesn't exist in this branch", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[get("/classes/<id>/sections")]
#[tracing::instrument(skip(backend))]
pub async fn section_list(
    id: Uuid,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Vec<Section>>, Problem> {
    Ok(Json(backend.sections_for_class(&operator, id).await?))
}

#[utoipa::path(
    request_body = SectionData,
    responses(
        (status = 200, description = "Created section", body = Section),
        (status = 400, description = "Missing class or name", body = Problem),
        (status = 422, description = "Class doesn't exist in this branch", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[post("/sections", format = "application/json", data = "<section>")]
#[tracing::instrument(skip(backend))]
pub async fn section_create(
    section: Json<SectionData>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Section>, Problem> {
    Ok(Json(
        backend.create_section(&operator, section.into_inner()).await?,
    ))
}

/// Subjects taught in a class
#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Subjects sorted by name", body = Vec<Subject>),
        (status = 422, description = "Class doesn't exist in this branch", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[get("/classes/<id>/subjects")]
#[tracing::instrument(skip(backend))]
pub async fn subject_list(
    id: Uuid,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Vec<Subject>>, Problem> {
    Ok(Json(backend.subjects_for_class(&operator, id).await?))
}

#[utoipa::path(
    request_body = SubjectData,
    responses(
        (status = 200, description = "Created subject", body = Subject),
        (status = 400, description = "Missing class or name", body = Problem),
        (status = 422, description = "Class doesn't exist in this branch", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[post("/subjects", format = "application/json", data = "<subject>")]
#[tracing::instrument(skip(backend))]
pub async fn subject_create(
    subject: Json<SubjectData>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Subject>, Problem> {
    Ok(Json(
        backend.create_subject(&operator, subject.into_inner()).await?,
    ))
}

#[utoipa::path(
    responses(
        (status = 200, description = "Teachers sorted by name", body = Vec<Teacher>),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[get("/teachers")]
#[tracing::instrument(skip(backend))]
pub async fn teacher_list(
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Vec<Teacher>>, Problem> {
    Ok(Json(backend.list_teachers(&operator).await?))
}

#[utoipa::path(
    request_body = TeacherData,
    responses(
        (status = 200, description = "Created teacher", body = Teacher),
        (status = 400, description = "Blank name", body = Problem),
    ),
    security(("branch" = []), ("operator" = []))
)]
#[post("/teachers", format = "application/json", data = "<teacher>")]
#[tracing::instrument(skip(backend))]
pub async fn teacher_create(
    teacher: Json<TeacherData>,
    operator: OperatorContext,
    backend: &State<Backend>,
) -> Result<Json<Teacher>, Problem> {
    Ok(Json(
        backend.create_teacher(&operator, teacher.into_inner()).await?,
    ))
}
