//! Student business logic

use crate::domain::{Role, StringUuid};
use crate::error::{AppError, Result};
use crate::policy::{enforce, CallerContext, PolicyAction, PolicyInput, ResourceScope};
use crate::repository::{ClassroomRepository, StudentRepository};
use std::sync::Arc;
use tracing::info;

pub struct StudentService<S: StudentRepository, C: ClassroomRepository> {
    student_repo: Arc<S>,
    classroom_repo: Arc<C>,
}

impl<S: StudentRepository, C: ClassroomRepository> StudentService<S, C> {
    pub fn new(student_repo: Arc<S>, classroom_repo: Arc<C>) -> Self {
        Self {
            student_repo,
            classroom_repo,
        }
    }

    /// Remove a tutor (guardian) assignment from a student
    pub async fn remove_tutor(
        &self,
        caller: &CallerContext,
        student_id: StringUuid,
        tutor_id: StringUuid,
    ) -> Result<()> {
        // An unknown student has no enrollment and is denied like a foreign one
        let caller_teaches_student = caller.role() == Role::Maestro
            && self
                .classroom_repo
                .teacher_has_active_student(caller.id(), student_id)
                .await?;

        enforce(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::TutorAssignmentRemove,
                ResourceScope::Student {
                    caller_teaches_student,
                },
            ),
        )?;

        if self.student_repo.find_by_id(student_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Student {} not found", student_id)));
        }

        if self
            .student_repo
            .remove_tutor_assignment(student_id, tutor_id)
            .await?
            == 0
        {
            return Err(AppError::NotFound(format!(
                "Tutor {} is not assigned to student {}",
                tutor_id, student_id
            )));
        }

        info!(
            student_id = %student_id,
            tutor_id = %tutor_id,
            actor_id = %caller.id(),
            "Tutor assignment removed"
        );
        Ok(())
    }
}
