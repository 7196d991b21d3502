//! Institution (tenant) domain model

use super::common::{deserialize_nullable, SoftDeletable, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Institution entity, the tenant boundary
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Institution {
    pub id: StringUuid,
    pub name: String,
    pub code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeletable for Institution {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Default for Institution {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            name: String::new(),
            code: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Input for creating an institution
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateInstitutionInput {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(length(min = 1, max = 32), regex(path = *INSTITUTION_CODE_REGEX))]
    pub code: Option<String>,
}

/// Input for updating an institution. `code: null` clears the code.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateInstitutionInput {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(length(min = 1, max = 32), regex(path = *INSTITUTION_CODE_REGEX))]
    pub code: Option<Option<String>>,
}

/// Names must contain something other than whitespace
fn validate_name(name: &str) -> Result<(), validator::ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 255 {
        return Err(validator::ValidationError::new("invalid_name"));
    }
    Ok(())
}

lazy_static::lazy_static! {
    pub static ref INSTITUTION_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap();
}
