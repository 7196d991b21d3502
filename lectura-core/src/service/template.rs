//! Evaluation template business logic

use crate::domain::{
    AddSequenceItemsInput, AddVocabularyItemsInput, SequenceItem, StringUuid, Template,
    VocabularyItem,
};
use crate::error::{AppError, Result};
use crate::policy::{enforce, CallerContext, PolicyAction, PolicyInput, ResourceScope};
use crate::repository::TemplateRepository;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct TemplateService<T: TemplateRepository> {
    repo: Arc<T>,
}

impl<T: TemplateRepository> TemplateService<T> {
    pub fn new(repo: Arc<T>) -> Self {
        Self { repo }
    }

    async fn authorize_write(&self, caller: &CallerContext, id: StringUuid) -> Result<Template> {
        let template = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Template {} not found", id)))?;

        enforce(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::TemplateWrite,
                ResourceScope::Template {
                    institution_id: template.institution_id,
                },
            ),
        )?;
        Ok(template)
    }

    pub async fn add_sequence_items(
        &self,
        caller: &CallerContext,
        template_id: StringUuid,
        input: AddSequenceItemsInput,
    ) -> Result<Vec<SequenceItem>> {
        input.validate()?;
        self.authorize_write(caller, template_id).await?;

        let items = self
            .repo
            .add_sequence_items(template_id, &input.items)
            .await?;
        info!(
            template_id = %template_id,
            count = items.len(),
            actor_id = %caller.id(),
            "Sequence items added"
        );
        Ok(items)
    }

    pub async fn add_vocabulary_items(
        &self,
        caller: &CallerContext,
        template_id: StringUuid,
        input: AddVocabularyItemsInput,
    ) -> Result<Vec<VocabularyItem>> {
        input.validate()?;
        self.authorize_write(caller, template_id).await?;

        let items = self
            .repo
            .add_vocabulary_items(template_id, &input.items)
            .await?;
        info!(
            template_id = %template_id,
            count = items.len(),
            actor_id = %caller.id(),
            "Vocabulary items added"
        );
        Ok(items)
    }
}
