//! Profile (directory) business logic

use crate::domain::{
    Profile, ProfileAssignment, ProfileFilter, ProfileRow, Role, StringUuid, UpdateChildInfoInput,
    UpdateProfileInput,
};
use crate::error::{AppError, Result};
use crate::policy::{enforce, CallerContext, PolicyAction, PolicyInput, ResourceScope};
use crate::repository::{InstitutionRepository, ProfileRepository};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct ProfileService<P: ProfileRepository, I: InstitutionRepository> {
    profile_repo: Arc<P>,
    institution_repo: Arc<I>,
}

impl<P: ProfileRepository, I: InstitutionRepository> ProfileService<P, I> {
    pub fn new(profile_repo: Arc<P>, institution_repo: Arc<I>) -> Self {
        Self {
            profile_repo,
            institution_repo,
        }
    }

    /// The caller's own profile
    pub fn me(&self, caller: &CallerContext) -> Result<Profile> {
        enforce(
            &caller.profile,
            &PolicyInput::new(PolicyAction::ProfileSelf, ResourceScope::Profile(caller.id())),
        )?;
        Ok(caller.profile.clone())
    }

    pub async fn list(&self, caller: &CallerContext, filter: ProfileFilter) -> Result<Vec<Profile>> {
        enforce(
            &caller.profile,
            &PolicyInput::new(PolicyAction::UserRead, ResourceScope::Global),
        )?;
        let rows = self.profile_repo.list(&filter).await?;
        Ok(into_profiles(rows))
    }

    /// Teachers (`maestro` profiles) of an institution
    pub async fn list_teachers(
        &self,
        caller: &CallerContext,
        institution_id: StringUuid,
    ) -> Result<Vec<Profile>> {
        enforce(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::TeacherList,
                ResourceScope::Institution(institution_id),
            ),
        )?;

        if self
            .institution_repo
            .find_by_id(institution_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Institution {} not found",
                institution_id
            )));
        }

        let rows = self
            .profile_repo
            .list(&ProfileFilter {
                role: Some(Role::Maestro),
                institution_id: Some(institution_id),
            })
            .await?;
        Ok(into_profiles(rows))
    }

    /// Master-only change of another profile's role and institution
    pub async fn update_assignment(
        &self,
        caller: &CallerContext,
        target_id: StringUuid,
        input: UpdateProfileInput,
    ) -> Result<Profile> {
        if matches!(input.role, Some(None)) {
            return Err(AppError::invalid_field("role", "Role cannot be null"));
        }
        let requested_role = input.role.flatten();

        enforce(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::UserWrite,
                ResourceScope::RoleChange {
                    target_id,
                    requested_role,
                },
            ),
        )?;

        let current = self
            .profile_repo
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", target_id)))?;

        let role = match requested_role {
            Some(role) => role,
            None => current
                .role
                .parse::<Role>()
                .map_err(|_| AppError::invalid_field("role", "Profile has no valid role"))?,
        };
        let institution_id = match input.institution_id {
            Some(value) => value,
            None => current.institution_id,
        };

        if role.requires_institution() && institution_id.is_none() {
            return Err(AppError::invalid_field(
                "institution_id",
                format!("Role {} requires an institution", role),
            ));
        }
        if role == Role::Master && institution_id.is_some() {
            return Err(AppError::invalid_field(
                "institution_id",
                "A master cannot belong to an institution",
            ));
        }
        if let Some(id) = institution_id {
            if self.institution_repo.find_by_id(id).await?.is_none() {
                return Err(AppError::invalid_field(
                    "institution_id",
                    "Institution does not exist",
                ));
            }
        }

        let assignment = ProfileAssignment {
            role,
            institution_id,
        };
        if self
            .profile_repo
            .update_assignment(target_id, &assignment)
            .await?
            == 0
        {
            return Err(AppError::NotFound(format!("Profile {} not found", target_id)));
        }

        info!(
            profile_id = %target_id,
            actor_id = %caller.id(),
            role = %role,
            "Profile assignment updated"
        );
        self.reload(target_id).await
    }

    /// Tutor self-service update of child information
    pub async fn update_child_info(
        &self,
        caller: &CallerContext,
        input: UpdateChildInfoInput,
    ) -> Result<Profile> {
        input.validate()?;
        enforce(
            &caller.profile,
            &PolicyInput::new(
                PolicyAction::TutorChildUpdate,
                ResourceScope::Profile(caller.id()),
            ),
        )?;

        let child_name = match input.child_name {
            Some(value) => value.map(|name| name.trim().to_string()),
            None => caller.profile.child_name.clone(),
        };
        let child_grade = match input.child_grade {
            Some(value) => value,
            None => caller.profile.child_grade,
        };

        if self
            .profile_repo
            .update_child_info(caller.id(), child_name, child_grade)
            .await?
            == 0
        {
            return Err(AppError::NotFound(format!(
                "Profile {} not found",
                caller.id()
            )));
        }

        info!(profile_id = %caller.id(), "Tutor child information updated");
        self.reload(caller.id()).await
    }

    async fn reload(&self, id: StringUuid) -> Result<Profile> {
        let row = self
            .profile_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))?;
        Profile::try_from(row).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
    }
}

/// Rows with unrecognized roles are left out of listings
fn into_profiles(rows: Vec<ProfileRow>) -> Vec<Profile> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Profile::try_from(row) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(profile_id = %id, error = %e, "Skipping profile with unrecognized role");
                    None
                }
            }
        })
        .collect()
}
