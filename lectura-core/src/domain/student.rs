//! Student domain model

use super::common::{SoftDeletable, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Student entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: StringUuid,
    pub institution_id: StringUuid,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeletable for Student {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Default for Student {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            institution_id: StringUuid::new_v4(),
            first_name: String::new(),
            last_name: String::new(),
            national_id: String::new(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}
