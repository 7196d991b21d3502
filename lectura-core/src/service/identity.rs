//! Identity resolution: authenticated user id to directory profile

use crate::domain::{Profile, StringUuid};
use crate::repository::ProfileRepository;
use std::sync::Arc;
use tracing::warn;

/// Resolves callers against the profile directory. Fails closed: lookup
/// errors and unrecognized roles both resolve to no profile.
pub struct IdentityResolver<P: ProfileRepository> {
    profile_repo: Arc<P>,
}

impl<P: ProfileRepository> IdentityResolver<P> {
    pub fn new(profile_repo: Arc<P>) -> Self {
        Self { profile_repo }
    }

    pub async fn resolve(&self, user_id: StringUuid) -> Option<Profile> {
        let row = match self.profile_repo.find_by_id(user_id).await {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Profile lookup failed");
                return None;
            }
        };

        match Profile::try_from(row) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Profile has unrecognized role");
                None
            }
        }
    }
}
