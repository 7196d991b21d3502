//! Evaluation template domain model

use super::common::{SoftDeletable, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Reading evaluation template. Templates without an institution are
/// platform-wide and only editable by a master.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    pub id: StringUuid,
    pub institution_id: Option<StringUuid>,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeletable for Template {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Default for Template {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            institution_id: None,
            title: String::new(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SequenceItem {
    pub id: StringUuid,
    pub template_id: StringUuid,
    pub position: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VocabularyItem {
    pub id: StringUuid,
    pub template_id: StringUuid,
    pub word: String,
    pub definition: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SequenceItemInput {
    #[validate(range(min = 0, max = 10_000))]
    pub position: i32,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct VocabularyItemInput {
    #[validate(length(min = 1, max = 120))]
    pub word: String,
    #[validate(length(max = 1000))]
    pub definition: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AddSequenceItemsInput {
    #[validate(length(min = 1, max = 200), nested)]
    pub items: Vec<SequenceItemInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AddVocabularyItemsInput {
    #[validate(length(min = 1, max = 200), nested)]
    pub items: Vec<VocabularyItemInput>,
}
