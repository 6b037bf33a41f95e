use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Named, SchoolClass, Section, Subject, Teacher};
use crate::error::{ReferenceKind, ScheduleError};
use crate::resp::operator::OperatorContext;
use crate::store::{Query, Record, Store};
use crate::util::{required, required_text};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClassData {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SectionData {
    pub class_id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubjectData {
    pub class_id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TeacherData {
    pub name: Option<String>,
}

/// Loads a record by id, treating records of other branches as absent.
pub async fn find_in_branch<R: Record, S: Store>(
    store: &S,
    kind: ReferenceKind,
    branch_id: Uuid,
    id: Uuid,
) -> Result<R, ScheduleError> {
    store
        .find_one(Query::by_id(id).eq("branch_id", branch_id))
        .await?
        .ok_or(ScheduleError::missing(kind, id))
}

fn sorted_by_name<R: Named>(mut records: Vec<R>) -> Vec<R> {
    records.sort_by_cached_key(|it| it.name().to_lowercase());
    records
}

#[allow(async_fn_in_trait)]
pub trait DirectoryDbExt {
    async fn create_class(
        &self,
        operator: &OperatorContext,
        data: ClassData,
    ) -> Result<SchoolClass, ScheduleError>;
    async fn list_classes(
        &self,
        operator: &OperatorContext,
    ) -> Result<Vec<SchoolClass>, ScheduleError>;

    async fn create_section(
        &self,
        operator: &OperatorContext,
        data: SectionData,
    ) -> Result<Section, ScheduleError>;
    async fn sections_for_class(
        &self,
        operator: &OperatorContext,
        class_id: Uuid,
    ) -> Result<Vec<Section>, ScheduleError>;

    async fn create_subject(
        &self,
        operator: &OperatorContext,
        data: SubjectData,
    ) -> Result<Subject, ScheduleError>;
    async fn subjects_for_class(
        &self,
        operator: &OperatorContext,
        class_id: Uuid,
    ) -> Result<Vec<Subject>, ScheduleError>;

    async fn create_teacher(
        &self,
        operator: &OperatorContext,
        data: TeacherData,
    ) -> Result<Teacher, ScheduleError>;
    async fn list_teachers(
        &self,
        operator: &OperatorContext,
    ) -> Result<Vec<Teacher>, ScheduleError>;
}

impl<S: Store> DirectoryDbExt for S {
    async fn create_class(
        &self,
        operator: &OperatorContext,
        data: ClassData,
    ) -> Result<SchoolClass, ScheduleError> {
        let class = SchoolClass {
            id: Uuid::new_v4(),
            branch_id: operator.branch_id,
            name: required_text(data.name, "name")?,
        };
        self.insert(&class).await?;
        tracing::info!("Created class '{}' ({})", class.name, class.id);
        Ok(class)
    }

    async fn list_classes(
        &self,
        operator: &OperatorContext,
    ) -> Result<Vec<SchoolClass>, ScheduleError> {
        let classes: Vec<SchoolClass> = self
            .find(Query::new().eq("branch_id", operator.branch_id))
            .await?;
        Ok(sorted_by_name(classes))
    }

    async fn create_section(
        &self,
        operator: &OperatorContext,
        data: SectionData,
    ) -> Result<Section, ScheduleError> {
        let class_id = required(data.class_id, "class_id")?;
        let name = required_text(data.name, "name")?;
        let class: SchoolClass =
            find_in_branch(self, ReferenceKind::Class, operator.branch_id, class_id).await?;

        let section = Section {
            id: Uuid::new_v4(),
            branch_id: operator.branch_id,
            class_id: class.id,
            name,
        };
        self.insert(&section).await?;
        Ok(section)
    }

    async fn sections_for_class(
        &self,
        operator: &OperatorContext,
        class_id: Uuid,
    ) -> Result<Vec<Section>, ScheduleError> {
        let _: SchoolClass =
            find_in_branch(self, ReferenceKind::Class, operator.branch_id, class_id).await?;
        let sections: Vec<Section> = self.find(Query::new().eq("class_id", class_id)).await?;
        Ok(sorted_by_name(sections))
    }

    async fn create_subject(
        &self,
        operator: &OperatorContext,
        data: SubjectData,
    ) -> Result<Subject, ScheduleError> {
        let class_id = required(data.class_id, "class_id")?;
        let name = required_text(data.name, "name")?;
        let class: SchoolClass =
            find_in_branch(self, ReferenceKind::Class, operator.branch_id, class_id).await?;

        let subject = Subject {
            id: Uuid::new_v4(),
            branch_id: operator.branch_id,
            class_id: class.id,
            name,
        };
        self.insert(&subject).await?;
        Ok(subject)
    }

    async fn subjects_for_class(
        &self,
        operator: &OperatorContext,
        class_id: Uuid,
    ) -> Result<Vec<Subject>, ScheduleError> {
        let _: SchoolClass =
            find_in_branch(self, ReferenceKind::Class, operator.branch_id, class_id).await?;
        let subjects: Vec<Subject> = self.find(Query::new().eq("class_id", class_id)).await?;
        Ok(sorted_by_name(subjects))
    }

    async fn create_teacher(
        &self,
        operator: &OperatorContext,
        data: TeacherData,
    ) -> Result<Teacher, ScheduleError> {
        let teacher = Teacher {
            id: Uuid::new_v4(),
            branch_id: operator.branch_id,
            name: required_text(data.name, "name")?,
        };
        self.insert(&teacher).await?;
        tracing::info!("Registered teacher '{}' ({})", teacher.name, teacher.id);
        Ok(teacher)
    }

    async fn list_teachers(
        &self,
        operator: &OperatorContext,
    ) -> Result<Vec<Teacher>, ScheduleError> {
        let teachers: Vec<Teacher> = self
            .find(Query::new().eq("branch_id", operator.branch_id))
            .await?;
        Ok(sorted_by_name(teachers))
    }
}
