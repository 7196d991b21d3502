//! Institution repository

use crate::domain::{CreateInstitutionInput, Institution, StringUuid, UpdateInstitutionInput};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const DUPLICATE_CODE: &str = "An institution with this code already exists";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstitutionRepository: Send + Sync {
    async fn create(&self, input: &CreateInstitutionInput) -> Result<Institution>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Institution>>;
    /// Ordered by name, id
    async fn list(&self) -> Result<Vec<Institution>>;
    async fn update(&self, id: StringUuid, input: &UpdateInstitutionInput) -> Result<Institution>;
    async fn soft_delete(&self, id: StringUuid) -> Result<u64>;
}

pub struct InstitutionRepositoryImpl {
    pool: MySqlPool,
}

impl InstitutionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstitutionRepository for InstitutionRepositoryImpl {
    async fn create(&self, input: &CreateInstitutionInput) -> Result<Institution> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO institutions (id, name, code, created_at, updated_at)
            VALUES (?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.code)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_store(e, DUPLICATE_CODE))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create institution")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Institution>> {
        let institution = sqlx::query_as::<_, Institution>(
            r#"
            SELECT id, name, code, created_at, updated_at, deleted_at
            FROM institutions
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(institution)
    }

    async fn list(&self) -> Result<Vec<Institution>> {
        let institutions = sqlx::query_as::<_, Institution>(
            r#"
            SELECT id, name, code, created_at, updated_at, deleted_at
            FROM institutions
            WHERE deleted_at IS NULL
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(institutions)
    }

    async fn update(&self, id: StringUuid, input: &UpdateInstitutionInput) -> Result<Institution> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Institution {} not found", id)))?;

        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.name);
        let code = match &input.code {
            Some(code) => code.as_deref(),
            None => existing.code.as_deref(),
        };

        sqlx::query(
            r#"
            UPDATE institutions
            SET name = ?, code = ?, updated_at = NOW()
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_store(e, DUPLICATE_CODE))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Institution {} not found", id)))
    }

    async fn soft_delete(&self, id: StringUuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE institutions SET deleted_at = NOW() WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
