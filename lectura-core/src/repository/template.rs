//! Template repository

use crate::domain::{
    SequenceItem, SequenceItemInput, StringUuid, Template, VocabularyItem, VocabularyItemInput,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Template>>;
    /// Inserts all items in one transaction
    async fn add_sequence_items(
        &self,
        template_id: StringUuid,
        items: &[SequenceItemInput],
    ) -> Result<Vec<SequenceItem>>;
    /// Inserts all items in one transaction
    async fn add_vocabulary_items(
        &self,
        template_id: StringUuid,
        items: &[VocabularyItemInput],
    ) -> Result<Vec<VocabularyItem>>;
}

pub struct TemplateRepositoryImpl {
    pool: MySqlPool,
}

impl TemplateRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for TemplateRepositoryImpl {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Template>> {
        let template = sqlx::query_as::<_, Template>(
            r#"
            SELECT id, institution_id, title, created_at, deleted_at
            FROM evaluation_templates
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    async fn add_sequence_items(
        &self,
        template_id: StringUuid,
        items: &[SequenceItemInput],
    ) -> Result<Vec<SequenceItem>> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(items.len());
        let mut tx = self.pool.begin().await?;

        for item in items {
            let id = StringUuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO template_sequence_items (id, template_id, position, content, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(template_id)
            .bind(item.position)
            .bind(&item.content)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            created.push(SequenceItem {
                id,
                template_id,
                position: item.position,
                content: item.content.clone(),
                created_at: now,
            });
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn add_vocabulary_items(
        &self,
        template_id: StringUuid,
        items: &[VocabularyItemInput],
    ) -> Result<Vec<VocabularyItem>> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(items.len());
        let mut tx = self.pool.begin().await?;

        for item in items {
            let id = StringUuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO template_vocabulary_items (id, template_id, word, definition, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(template_id)
            .bind(&item.word)
            .bind(&item.definition)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            created.push(VocabularyItem {
                id,
                template_id,
                word: item.word.clone(),
                definition: item.definition.clone(),
                created_at: now,
            });
        }

        tx.commit().await?;
        Ok(created)
    }
}
