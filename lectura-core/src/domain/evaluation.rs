//! Evaluation session and attempt domain types

use super::common::{SoftDeletable, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Evaluation session status. `Open -> Closed` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Open,
    Closed,
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Unknown session status: {}", s)),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for SessionStatus {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for SessionStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

/// Attempt status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    #[default]
    Pending,
    Submitted,
}

impl std::str::FromStr for AttemptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            _ => Err(format!("Unknown attempt status: {}", s)),
        }
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Submitted => write!(f, "submitted"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for AttemptStatus {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for AttemptStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

/// One published assessment instance
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationSession {
    pub id: StringUuid,
    pub institution_id: StringUuid,
    pub classroom_id: StringUuid,
    pub teacher_profile_id: StringUuid,
    pub text_id: StringUuid,
    pub quiz_id: StringUuid,
    pub status: SessionStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_by: Option<StringUuid>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EvaluationSession {
    /// Whether students may still enter the session
    pub fn accepts_entries(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Open
            && self.is_visible()
            && self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

impl SoftDeletable for EvaluationSession {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Default for EvaluationSession {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            institution_id: StringUuid::new_v4(),
            classroom_id: StringUuid::new_v4(),
            teacher_profile_id: StringUuid::new_v4(),
            text_id: StringUuid::new_v4(),
            quiz_id: StringUuid::new_v4(),
            status: SessionStatus::default(),
            expires_at: None,
            closed_at: None,
            updated_by: None,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

/// One student's instance of a session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationAttempt {
    pub id: StringUuid,
    pub session_id: StringUuid,
    pub student_id: StringUuid,
    pub status: AttemptStatus,
    pub score_percent: Option<f64>,
    pub correct_count: Option<i32>,
    pub total_questions: Option<i32>,
    pub reading_time_ms: Option<i64>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Default for EvaluationAttempt {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            session_id: StringUuid::new_v4(),
            student_id: StringUuid::new_v4(),
            status: AttemptStatus::default(),
            score_percent: None,
            correct_count: None,
            total_questions: None,
            reading_time_ms: None,
            submitted_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Attempt roster row: attempt joined with its student and the metadata of
/// its active access code. Never carries a plaintext code.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptRosterEntry {
    pub attempt_id: StringUuid,
    pub student_id: StringUuid,
    pub student_first_name: String,
    pub student_last_name: String,
    pub status: AttemptStatus,
    pub score_percent: Option<f64>,
    pub submitted_at: Option<DateTime<Utc>>,
    /// Issue time of the active access code, `None` when no code is active
    pub code_issued_at: Option<DateTime<Utc>>,
}

impl AttemptRosterEntry {
    pub fn has_active_code(&self) -> bool {
        self.code_issued_at.is_some()
    }
}

/// A student's attempt together with the owning session's context
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptHistoryEntry {
    pub attempt_id: StringUuid,
    pub session_id: StringUuid,
    pub classroom_id: StringUuid,
    pub teacher_profile_id: StringUuid,
    pub session_status: SessionStatus,
    pub status: AttemptStatus,
    pub score_percent: Option<f64>,
    pub correct_count: Option<i32>,
    pub total_questions: Option<i32>,
    pub reading_time_ms: Option<i64>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Freshly generated access code. This is the only value that ever carries
/// the plaintext and it is returned to the caller exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedAccessCode {
    pub attempt_id: StringUuid,
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

/// Attempt resolved from a redeemed access code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AccessCodeRedemption {
    pub attempt_id: StringUuid,
    pub session_id: StringUuid,
    pub student_id: StringUuid,
}

/// Input for publishing an evaluation session
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PublishSessionInput {
    pub classroom_id: StringUuid,
    pub text_id: StringUuid,
    pub quiz_id: StringUuid,
    /// Minutes until the session stops accepting entries (max one week)
    #[validate(range(min = 1, max = 10080))]
    pub expires_in_minutes: Option<i32>,
}

/// Input for redeeming an access code
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RedeemAccessCodeInput {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}
