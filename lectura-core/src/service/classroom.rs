//! Classroom business logic

use crate::domain::{sort_classrooms, Classroom, ClassroomFilter, ClassroomListQuery, StringUuid};
use crate::error::{AppError, Result};
use crate::policy::{
    enforce, enforce_read, CallerContext, PolicyAction, PolicyInput, ResourceScope, ScopeFilter,
};
use crate::repository::ClassroomRepository;
use std::sync::Arc;
use tracing::info;

pub struct ClassroomService<C: ClassroomRepository> {
    repo: Arc<C>,
}

impl<C: ClassroomRepository> ClassroomService<C> {
    pub fn new(repo: Arc<C>) -> Self {
        Self { repo }
    }

    /// Classrooms visible to the caller, ordered by grade, name, id
    pub async fn list(
        &self,
        caller: &CallerContext,
        query: ClassroomListQuery,
    ) -> Result<Vec<Classroom>> {
        let scope = enforce(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::ClassroomList,
                ResourceScope::InstitutionFilter(query.institution_id),
            ),
        )?;

        let filter = match scope {
            ScopeFilter::Unrestricted => ClassroomFilter::default(),
            ScopeFilter::Institution(institution_id) => ClassroomFilter {
                institution_id: Some(institution_id),
                teacher_id: None,
            },
            ScopeFilter::AssignedTeacher(teacher_id) => ClassroomFilter {
                institution_id: query.institution_id,
                teacher_id: Some(teacher_id),
            },
            other => {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "Unexpected classroom list scope {:?}",
                    other
                )))
            }
        };

        let mut classrooms = self.repo.list(&filter).await?;
        sort_classrooms(&mut classrooms);
        Ok(classrooms)
    }

    pub async fn get(&self, caller: &CallerContext, id: StringUuid) -> Result<Classroom> {
        let not_found = || format!("Classroom {} not found", id);
        let classroom = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(not_found()))?;

        let scope = enforce_read(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::ClassroomRead,
                ResourceScope::Classroom {
                    institution_id: classroom.institution_id,
                },
            ),
            not_found,
        )?;

        if let ScopeFilter::AssignedTeacher(teacher_id) = scope {
            if !self.repo.is_teacher_assigned(id, teacher_id).await? {
                return Err(AppError::NotFound(not_found()));
            }
        }
        Ok(classroom)
    }

    pub async fn remove_teacher(
        &self,
        caller: &CallerContext,
        classroom_id: StringUuid,
        teacher_id: StringUuid,
    ) -> Result<()> {
        let classroom = self
            .repo
            .find_by_id(classroom_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Classroom {} not found", classroom_id)))?;

        enforce(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::TeacherRemove,
                ResourceScope::Classroom {
                    institution_id: classroom.institution_id,
                },
            ),
        )?;

        if self.repo.remove_teacher(classroom_id, teacher_id).await? == 0 {
            return Err(AppError::NotFound(format!(
                "Teacher {} is not assigned to classroom {}",
                teacher_id, classroom_id
            )));
        }

        info!(
            classroom_id = %classroom_id,
            teacher_id = %teacher_id,
            actor_id = %caller.id(),
            "Teacher removed from classroom"
        );
        Ok(())
    }
}
