//! Evaluation session lifecycle and attempt access codes

use super::access_code::{generate_access_code, normalize_access_code};
use crate::domain::{
    AccessCodeRedemption, AttemptHistoryEntry, AttemptRosterEntry, EvaluationSession,
    IssuedAccessCode, PublishSessionInput, RedeemAccessCodeInput, SessionStatus, StringUuid,
};
use crate::error::{AppError, Result};
use crate::policy::{
    enforce, enforce_read, CallerContext, PolicyAction, PolicyInput, ResourceScope, ScopeFilter,
};
use crate::repository::{EvaluationProcedures, EvaluationRepository, StudentRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

pub struct EvaluationService<E, X, S>
where
    E: EvaluationRepository,
    X: EvaluationProcedures,
    S: StudentRepository,
{
    repo: Arc<E>,
    procedures: Arc<X>,
    student_repo: Arc<S>,
}

impl<E, X, S> EvaluationService<E, X, S>
where
    E: EvaluationRepository,
    X: EvaluationProcedures,
    S: StudentRepository,
{
    pub fn new(repo: Arc<E>, procedures: Arc<X>, student_repo: Arc<S>) -> Self {
        Self {
            repo,
            procedures,
            student_repo,
        }
    }

    async fn load_session(&self, id: StringUuid) -> Result<EvaluationSession> {
        self.repo
            .find_session(id)
            .await?
            .ok_or_else(|| session_not_found(id))
    }

    fn session_scope(session: &EvaluationSession) -> ResourceScope {
        ResourceScope::Session {
            institution_id: session.institution_id,
            owner_id: session.teacher_profile_id,
        }
    }

    pub async fn publish(
        &self,
        caller: &CallerContext,
        input: PublishSessionInput,
    ) -> Result<EvaluationSession> {
        input.validate()?;
        enforce(
            &caller.profile,
            &PolicyInput::new(PolicyAction::SessionPublish, ResourceScope::Global),
        )?;

        let session_id = self
            .procedures
            .publish_evaluation_session(caller.id(), &input)
            .await?;
        let session = self.repo.find_session(session_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Published session {} could not be read back",
                session_id
            ))
        })?;

        info!(
            session_id = %session.id,
            classroom_id = %session.classroom_id,
            actor_id = %caller.id(),
            "Evaluation session published"
        );
        Ok(session)
    }

    pub async fn get_session(
        &self,
        caller: &CallerContext,
        id: StringUuid,
    ) -> Result<EvaluationSession> {
        let session = self.load_session(id).await?;
        enforce_read(
            &caller.profile,
            &PolicyInput::new(PolicyAction::SessionRead, Self::session_scope(&session)),
            || format!("Evaluation session {} not found", id),
        )?;
        Ok(session)
    }

    /// `open -> closed`. A second close reports `Conflict` and leaves
    /// `closed_at` untouched.
    pub async fn close(&self, caller: &CallerContext, id: StringUuid) -> Result<EvaluationSession> {
        let session = self.load_session(id).await?;
        enforce(
            &caller.profile,
            &PolicyInput::new(PolicyAction::SessionClose, Self::session_scope(&session)),
        )?;

        if self.repo.close_session(id, caller.id()).await? == 0 {
            return match self.repo.find_session(id).await? {
                None => Err(session_not_found(id)),
                Some(current) if current.status == SessionStatus::Closed => Err(
                    AppError::Conflict(format!("Evaluation session {} is already closed", id)),
                ),
                Some(_) => Err(AppError::Internal(anyhow::anyhow!(
                    "Evaluation session {} is open but could not be closed",
                    id
                ))),
            };
        }

        metrics::counter!("lectura_sessions_closed_total").increment(1);
        info!(session_id = %id, actor_id = %caller.id(), "Evaluation session closed");
        self.load_session(id).await
    }

    /// Attempt roster with access code metadata; plaintext codes are never listed
    pub async fn list_attempt_codes(
        &self,
        caller: &CallerContext,
        session_id: StringUuid,
    ) -> Result<Vec<AttemptRosterEntry>> {
        let session = self.load_session(session_id).await?;
        enforce_read(
            &caller.profile,
            &PolicyInput::new(PolicyAction::AttemptCodeRead, Self::session_scope(&session)),
            || format!("Evaluation session {} not found", session_id),
        )?;
        self.repo.list_session_attempts(session_id).await
    }

    /// Issue a new access code for an attempt, revoking the previous one. The
    /// plaintext is returned only here.
    pub async fn regenerate_code(
        &self,
        caller: &CallerContext,
        session_id: StringUuid,
        attempt_id: StringUuid,
    ) -> Result<IssuedAccessCode> {
        let session = self.load_session(session_id).await?;
        enforce(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::AttemptCodeRegenerate,
                Self::session_scope(&session),
            ),
        )?;

        match self.repo.find_attempt(attempt_id).await? {
            Some(attempt) if attempt.session_id == session_id => {}
            _ => {
                return Err(AppError::NotFound(format!(
                    "Attempt {} not found in session {}",
                    attempt_id, session_id
                )))
            }
        }

        let code = generate_access_code();
        self.procedures
            .regenerate_attempt_code(caller.id(), attempt_id, &code)
            .await?;

        metrics::counter!("lectura_access_codes_regenerated_total").increment(1);
        info!(
            session_id = %session_id,
            attempt_id = %attempt_id,
            actor_id = %caller.id(),
            "Access code regenerated"
        );
        Ok(IssuedAccessCode {
            attempt_id,
            code,
            issued_at: Utc::now(),
        })
    }

    /// Resolve a student's access code to their pending attempt
    pub async fn redeem_code(&self, input: RedeemAccessCodeInput) -> Result<AccessCodeRedemption> {
        let code = normalize_access_code(&input.code)
            .ok_or_else(|| AppError::invalid_field("code", "Malformed access code"))?;

        let redemption = self
            .repo
            .find_redeemable_attempt(&code)
            .await?
            .ok_or_else(|| {
                debug!("Access code did not match a redeemable attempt");
                AppError::NotFound("Access code not found".to_string())
            })?;

        metrics::counter!("lectura_access_codes_redeemed_total").increment(1);
        info!(
            attempt_id = %redemption.attempt_id,
            session_id = %redemption.session_id,
            "Access code redeemed"
        );
        Ok(redemption)
    }

    /// A student's attempts, newest first. Teachers only see attempts of
    /// sessions they own.
    pub async fn student_history(
        &self,
        caller: &CallerContext,
        student_id: StringUuid,
    ) -> Result<Vec<AttemptHistoryEntry>> {
        let scope = enforce(
            &caller.profile,
            &PolicyInput::new(PolicyAction::StudentHistoryRead, ResourceScope::Global),
        )?;

        let student = self
            .student_repo
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| student_not_found(student_id))?;

        // Students of another institution are reported exactly like missing ones
        let owner_id = match scope {
            ScopeFilter::OwnedSessions(owner_id) => {
                if caller.profile.institution_id != Some(student.institution_id) {
                    return Err(student_not_found(student_id));
                }
                Some(owner_id)
            }
            _ => None,
        };
        self.repo.list_student_attempts(student_id, owner_id).await
    }
}

fn student_not_found(id: StringUuid) -> AppError {
    AppError::NotFound(format!("Student {} not found", id))
}

fn session_not_found(id: StringUuid) -> AppError {
    AppError::NotFound(format!("Evaluation session {} not found", id))
}
