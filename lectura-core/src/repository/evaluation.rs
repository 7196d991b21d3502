//! Evaluation session and attempt repository

use crate::domain::{
    AccessCodeRedemption, AttemptHistoryEntry, AttemptRosterEntry, EvaluationAttempt,
    EvaluationSession, StringUuid,
};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    async fn find_session(&self, id: StringUuid) -> Result<Option<EvaluationSession>>;
    /// Conditional `open -> closed` transition. Returns affected rows; zero
    /// means the session was missing or already closed.
    async fn close_session(&self, id: StringUuid, actor_id: StringUuid) -> Result<u64>;
    async fn find_attempt(&self, id: StringUuid) -> Result<Option<EvaluationAttempt>>;
    /// Ordered by student last name, first name, attempt id
    async fn list_session_attempts(&self, session_id: StringUuid)
        -> Result<Vec<AttemptRosterEntry>>;
    /// Newest first. `owner_id` restricts to sessions owned by that teacher.
    async fn list_student_attempts(
        &self,
        student_id: StringUuid,
        owner_id: Option<StringUuid>,
    ) -> Result<Vec<AttemptHistoryEntry>>;
    /// Resolve a normalized plaintext code against active codes of pending
    /// attempts in open, unexpired sessions
    async fn find_redeemable_attempt(&self, code: &str) -> Result<Option<AccessCodeRedemption>>;
}

pub struct EvaluationRepositoryImpl {
    pool: MySqlPool,
}

impl EvaluationRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationRepository for EvaluationRepositoryImpl {
    async fn find_session(&self, id: StringUuid) -> Result<Option<EvaluationSession>> {
        let session = sqlx::query_as::<_, EvaluationSession>(
            r#"
            SELECT id, institution_id, classroom_id, teacher_profile_id, text_id, quiz_id,
                   status, expires_at, closed_at, updated_by, created_at, deleted_at
            FROM evaluation_sessions
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn close_session(&self, id: StringUuid, actor_id: StringUuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE evaluation_sessions
            SET status = 'closed', closed_at = NOW(), updated_by = ?
            WHERE id = ? AND status = 'open' AND deleted_at IS NULL
            "#,
        )
        .bind(actor_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_attempt(&self, id: StringUuid) -> Result<Option<EvaluationAttempt>> {
        let attempt = sqlx::query_as::<_, EvaluationAttempt>(
            r#"
            SELECT id, session_id, student_id, status, score_percent, correct_count,
                   total_questions, reading_time_ms, submitted_at, created_at
            FROM evaluation_attempts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn list_session_attempts(
        &self,
        session_id: StringUuid,
    ) -> Result<Vec<AttemptRosterEntry>> {
        let entries = sqlx::query_as::<_, AttemptRosterEntry>(
            r#"
            SELECT a.id AS attempt_id, a.student_id,
                   s.first_name AS student_first_name, s.last_name AS student_last_name,
                   a.status, a.score_percent, a.submitted_at,
                   c.issued_at AS code_issued_at
            FROM evaluation_attempts a
            JOIN students s ON s.id = a.student_id AND s.deleted_at IS NULL
            LEFT JOIN attempt_access_codes c
              ON c.attempt_id = a.id AND c.revoked_at IS NULL
            WHERE a.session_id = ?
            ORDER BY s.last_name, s.first_name, a.id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn list_student_attempts(
        &self,
        student_id: StringUuid,
        owner_id: Option<StringUuid>,
    ) -> Result<Vec<AttemptHistoryEntry>> {
        let entries = sqlx::query_as::<_, AttemptHistoryEntry>(
            r#"
            SELECT a.id AS attempt_id, a.session_id, es.classroom_id, es.teacher_profile_id,
                   es.status AS session_status, a.status, a.score_percent, a.correct_count,
                   a.total_questions, a.reading_time_ms, a.submitted_at, a.created_at
            FROM evaluation_attempts a
            JOIN evaluation_sessions es ON es.id = a.session_id AND es.deleted_at IS NULL
            WHERE a.student_id = ?
              AND (? IS NULL OR es.teacher_profile_id = ?)
            ORDER BY a.created_at DESC, a.id
            "#,
        )
        .bind(student_id)
        .bind(owner_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_redeemable_attempt(&self, code: &str) -> Result<Option<AccessCodeRedemption>> {
        let redemption = sqlx::query_as::<_, AccessCodeRedemption>(
            r#"
            SELECT a.id AS attempt_id, a.session_id, a.student_id
            FROM attempt_access_codes c
            JOIN evaluation_attempts a ON a.id = c.attempt_id
            JOIN evaluation_sessions es ON es.id = a.session_id
            WHERE c.code_hash = SHA2(?, 256)
              AND c.revoked_at IS NULL
              AND a.status = 'pending'
              AND es.status = 'open'
              AND es.deleted_at IS NULL
              AND (es.expires_at IS NULL OR es.expires_at > NOW())
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(redemption)
    }
}
