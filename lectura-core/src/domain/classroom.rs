//! Classroom domain model

use super::common::{SoftDeletable, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Classroom entity, scoped to one institution
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Classroom {
    pub id: StringUuid,
    pub institution_id: StringUuid,
    pub name: String,
    pub grade: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeletable for Classroom {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Default for Classroom {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            institution_id: StringUuid::new_v4(),
            name: String::new(),
            grade: 1,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

/// Storage-level classroom filter. Both fields narrow the result when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassroomFilter {
    pub institution_id: Option<StringUuid>,
    pub teacher_id: Option<StringUuid>,
}

/// Query parameters accepted by the classroom listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassroomListQuery {
    pub institution_id: Option<StringUuid>,
}

/// Canonical listing order: grade, then name, then id
pub fn sort_classrooms(classrooms: &mut [Classroom]) {
    classrooms.sort_by(|a, b| {
        a.grade
            .cmp(&b.grade)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
}
