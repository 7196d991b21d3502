//! Profile (directory) domain model

use super::common::{deserialize_nullable, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Authorization role of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    Admin,
    Maestro,
    Tutor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Admin => "admin",
            Role::Maestro => "maestro",
            Role::Tutor => "tutor",
        }
    }

    /// Roles that must always be attached to an institution
    pub fn requires_institution(&self) -> bool {
        matches!(self, Role::Admin | Role::Maestro)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    // Exact match only: the directory stores lowercase role names and anything
    // else must leave the profile unresolved.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Role::Master),
            "admin" => Ok(Role::Admin),
            "maestro" => Ok(Role::Maestro),
            "tutor" => Ok(Role::Tutor),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw directory row. `role` is kept as text so that an unrecognized value
/// can be rejected when converting into a [`Profile`].
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: StringUuid,
    pub role: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub institution_id: Option<StringUuid>,
    pub child_name: Option<String>,
    pub child_grade: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolved profile with a recognized role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: StringUuid,
    pub role: Role,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub institution_id: Option<StringUuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_grade: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }
}

impl TryFrom<ProfileRow> for Profile {
    type Error = String;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>()?;
        Ok(Profile {
            id: row.id,
            role,
            email: row.email,
            full_name: row.full_name,
            institution_id: row.institution_id,
            child_name: row.child_name,
            child_grade: row.child_grade,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<Profile> for ProfileRow {
    fn from(profile: Profile) -> Self {
        ProfileRow {
            id: profile.id,
            role: profile.role.to_string(),
            email: profile.email,
            full_name: profile.full_name,
            institution_id: profile.institution_id,
            child_name: profile.child_name,
            child_grade: profile.child_grade,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            role: Role::Tutor,
            email: None,
            full_name: None,
            institution_id: None,
            child_name: None,
            child_grade: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Master-only update of another profile's role and institution.
///
/// Both fields distinguish "omitted" (keep current value) from an explicit
/// `null` (clear). A `null` role is never valid and is rejected by the service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateProfileInput {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub role: Option<Option<Role>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub institution_id: Option<Option<StringUuid>>,
}

/// Resolved assignment written back to the directory
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileAssignment {
    pub role: Role,
    pub institution_id: Option<StringUuid>,
}

/// Tutor self-service update of their child's information
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateChildInfoInput {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(custom(function = "validate_child_name"))]
    pub child_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(range(min = 1, max = 12))]
    pub child_grade: Option<Option<i32>>,
}

/// Checked on the trimmed value, since that is what gets stored
fn validate_child_name(name: &str) -> Result<(), validator::ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 120 {
        return Err(validator::ValidationError::new("invalid_child_name"));
    }
    Ok(())
}

/// Profile listing filter
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileFilter {
    pub role: Option<Role>,
    pub institution_id: Option<StringUuid>,
}
