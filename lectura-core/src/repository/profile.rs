//! Profile (directory) repository

use crate::domain::{ProfileAssignment, ProfileFilter, ProfileRow, StringUuid};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<ProfileRow>>;
    /// Ordered by full name, email, id
    async fn list(&self, filter: &ProfileFilter) -> Result<Vec<ProfileRow>>;
    async fn update_assignment(
        &self,
        id: StringUuid,
        assignment: &ProfileAssignment,
    ) -> Result<u64>;
    async fn update_child_info(
        &self,
        id: StringUuid,
        child_name: Option<String>,
        child_grade: Option<i32>,
    ) -> Result<u64>;
}

pub struct ProfileRepositoryImpl {
    pool: MySqlPool,
}

impl ProfileRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfileRepositoryImpl {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, role, email, full_name, institution_id, child_name, child_grade,
                   created_at, updated_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self, filter: &ProfileFilter) -> Result<Vec<ProfileRow>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, role, email, full_name, institution_id, child_name, child_grade,
                   created_at, updated_at
            FROM profiles
            WHERE (? IS NULL OR role = ?)
              AND (? IS NULL OR institution_id = ?)
            ORDER BY full_name, email, id
            "#,
        )
        .bind(filter.role.map(|r| r.as_str()))
        .bind(filter.role.map(|r| r.as_str()))
        .bind(filter.institution_id)
        .bind(filter.institution_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update_assignment(
        &self,
        id: StringUuid,
        assignment: &ProfileAssignment,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET role = ?, institution_id = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(assignment.role.as_str())
        .bind(assignment.institution_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_child_info(
        &self,
        id: StringUuid,
        child_name: Option<String>,
        child_grade: Option<i32>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET child_name = ?, child_grade = ?, updated_at = NOW()
            WHERE id = ? AND role = 'tutor'
            "#,
        )
        .bind(child_name)
        .bind(child_grade)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
