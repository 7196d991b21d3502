//! Student repository

use crate::domain::{StringUuid, Student};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Student>>;
    /// Soft-deletes the active tutor assignment, returning affected rows
    async fn remove_tutor_assignment(
        &self,
        student_id: StringUuid,
        tutor_id: StringUuid,
    ) -> Result<u64>;
}

pub struct StudentRepositoryImpl {
    pool: MySqlPool,
}

impl StudentRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for StudentRepositoryImpl {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, institution_id, first_name, last_name, national_id, created_at, deleted_at
            FROM students
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn remove_tutor_assignment(
        &self,
        student_id: StringUuid,
        tutor_id: StringUuid,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE student_tutors
            SET deleted_at = NOW()
            WHERE student_id = ? AND tutor_profile_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(student_id)
        .bind(tutor_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
