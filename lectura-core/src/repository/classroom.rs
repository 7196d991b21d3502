//! Classroom repository, including teacher assignments and enrollments

use crate::domain::{Classroom, ClassroomFilter, StringUuid};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassroomRepository: Send + Sync {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Classroom>>;
    /// Ordered by grade, name, id
    async fn list(&self, filter: &ClassroomFilter) -> Result<Vec<Classroom>>;
    async fn is_teacher_assigned(
        &self,
        classroom_id: StringUuid,
        teacher_id: StringUuid,
    ) -> Result<bool>;
    /// Soft-deletes the active assignment, returning affected rows
    async fn remove_teacher(&self, classroom_id: StringUuid, teacher_id: StringUuid)
        -> Result<u64>;
    /// Whether the teacher is assigned to a classroom where the student is
    /// actively enrolled
    async fn teacher_has_active_student(
        &self,
        teacher_id: StringUuid,
        student_id: StringUuid,
    ) -> Result<bool>;
}

pub struct ClassroomRepositoryImpl {
    pool: MySqlPool,
}

impl ClassroomRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassroomRepository for ClassroomRepositoryImpl {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Classroom>> {
        let classroom = sqlx::query_as::<_, Classroom>(
            r#"
            SELECT id, institution_id, name, grade, created_at, deleted_at
            FROM classrooms
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(classroom)
    }

    async fn list(&self, filter: &ClassroomFilter) -> Result<Vec<Classroom>> {
        let classrooms = sqlx::query_as::<_, Classroom>(
            r#"
            SELECT c.id, c.institution_id, c.name, c.grade, c.created_at, c.deleted_at
            FROM classrooms c
            WHERE c.deleted_at IS NULL
              AND (? IS NULL OR c.institution_id = ?)
              AND (? IS NULL OR EXISTS (
                    SELECT 1 FROM classroom_teachers ct
                    WHERE ct.classroom_id = c.id
                      AND ct.teacher_profile_id = ?
                      AND ct.deleted_at IS NULL))
            ORDER BY c.grade, c.name, c.id
            "#,
        )
        .bind(filter.institution_id)
        .bind(filter.institution_id)
        .bind(filter.teacher_id)
        .bind(filter.teacher_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(classrooms)
    }

    async fn is_teacher_assigned(
        &self,
        classroom_id: StringUuid,
        teacher_id: StringUuid,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM classroom_teachers
            WHERE classroom_id = ? AND teacher_profile_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(classroom_id)
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn remove_teacher(
        &self,
        classroom_id: StringUuid,
        teacher_id: StringUuid,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE classroom_teachers
            SET deleted_at = NOW()
            WHERE classroom_id = ? AND teacher_profile_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(classroom_id)
        .bind(teacher_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn teacher_has_active_student(
        &self,
        teacher_id: StringUuid,
        student_id: StringUuid,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM classroom_teachers ct
            JOIN classroom_students cs ON cs.classroom_id = ct.classroom_id
            JOIN classrooms c ON c.id = ct.classroom_id
            WHERE ct.teacher_profile_id = ?
              AND cs.student_id = ?
              AND ct.deleted_at IS NULL
              AND cs.active = 1
              AND c.deleted_at IS NULL
            "#,
        )
        .bind(teacher_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}
