//! Database-side evaluation procedures.
//!
//! Both procedures run inside the database and report business failures
//! through `SIGNAL SQLSTATE`; see [`AppError::from_procedure`]. A 45422
//! `MESSAGE_TEXT` starts with the offending column, e.g.
//! `"expires_in_minutes: must be positive"`.

use crate::domain::{PublishSessionInput, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvaluationProcedures: Send + Sync {
    /// Create a session with one pending attempt per enrolled student.
    /// Returns the new session id.
    async fn publish_evaluation_session(
        &self,
        actor_id: StringUuid,
        input: &PublishSessionInput,
    ) -> Result<StringUuid>;

    /// Store `new_code_plain` encoded as the attempt's only active code,
    /// revoking the previous one atomically
    async fn regenerate_attempt_code(
        &self,
        actor_id: StringUuid,
        attempt_id: StringUuid,
        new_code_plain: &str,
    ) -> Result<()>;
}

pub struct EvaluationProceduresImpl {
    pool: MySqlPool,
}

impl EvaluationProceduresImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationProcedures for EvaluationProceduresImpl {
    async fn publish_evaluation_session(
        &self,
        actor_id: StringUuid,
        input: &PublishSessionInput,
    ) -> Result<StringUuid> {
        let session_id: StringUuid =
            sqlx::query_scalar("CALL publish_evaluation_session(?, ?, ?, ?, ?)")
                .bind(actor_id)
                .bind(input.classroom_id)
                .bind(input.text_id)
                .bind(input.quiz_id)
                .bind(input.expires_in_minutes)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::from_procedure)?;

        Ok(session_id)
    }

    async fn regenerate_attempt_code(
        &self,
        actor_id: StringUuid,
        attempt_id: StringUuid,
        new_code_plain: &str,
    ) -> Result<()> {
        sqlx::query("CALL regenerate_attempt_code(?, ?, ?)")
            .bind(actor_id)
            .bind(attempt_id)
            .bind(new_code_plain)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_procedure)?;

        Ok(())
    }
}
