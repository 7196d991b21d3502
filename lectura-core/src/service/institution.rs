//! Institution business logic

use crate::domain::{CreateInstitutionInput, Institution, StringUuid, UpdateInstitutionInput};
use crate::error::{AppError, Result};
use crate::policy::{enforce, CallerContext, PolicyAction, PolicyInput, ResourceScope};
use crate::repository::InstitutionRepository;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct InstitutionService<R: InstitutionRepository> {
    repo: Arc<R>,
}

impl<R: InstitutionRepository> InstitutionService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    fn authorize(caller: &CallerContext, action: PolicyAction) -> Result<()> {
        enforce(
            &caller.profile,
            &PolicyInput::new(action, ResourceScope::Global),
        )?;
        Ok(())
    }

    pub async fn list(&self, caller: &CallerContext) -> Result<Vec<Institution>> {
        Self::authorize(caller, PolicyAction::InstitutionRead)?;
        self.repo.list().await
    }

    pub async fn get(&self, caller: &CallerContext, id: StringUuid) -> Result<Institution> {
        Self::authorize(caller, PolicyAction::InstitutionRead)?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Institution {} not found", id)))
    }

    pub async fn create(
        &self,
        caller: &CallerContext,
        input: CreateInstitutionInput,
    ) -> Result<Institution> {
        input.validate()?;
        Self::authorize(caller, PolicyAction::InstitutionWrite)?;

        let institution = self.repo.create(&input).await?;
        info!(
            institution_id = %institution.id,
            actor_id = %caller.id(),
            "Institution created"
        );
        Ok(institution)
    }

    pub async fn update(
        &self,
        caller: &CallerContext,
        id: StringUuid,
        input: UpdateInstitutionInput,
    ) -> Result<Institution> {
        input.validate()?;
        Self::authorize(caller, PolicyAction::InstitutionWrite)?;

        let institution = self.repo.update(id, &input).await?;
        info!(institution_id = %id, actor_id = %caller.id(), "Institution updated");
        Ok(institution)
    }

    pub async fn delete(&self, caller: &CallerContext, id: StringUuid) -> Result<()> {
        Self::authorize(caller, PolicyAction::InstitutionWrite)?;

        if self.repo.soft_delete(id).await? == 0 {
            return Err(AppError::NotFound(format!("Institution {} not found", id)));
        }
        info!(institution_id = %id, actor_id = %caller.id(), "Institution deleted");
        Ok(())
    }
}
