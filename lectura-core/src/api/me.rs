//! Endpoints about the calling profile itself

use super::{SuccessResponse, ValidatedJson};
use crate::domain::UpdateChildInfoInput;
use crate::error::Result;
use crate::policy::CallerContext;
use crate::state::HasServices;
use axum::{extract::State, response::IntoResponse, Json};

/// The resolved profile, used by clients to pick role-specific navigation
pub async fn get<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
) -> Result<impl IntoResponse> {
    let profile = state.profile_service().me(&caller)?;
    Ok(Json(SuccessResponse::new(profile)))
}

pub async fn update_child<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    ValidatedJson(input): ValidatedJson<UpdateChildInfoInput>,
) -> Result<impl IntoResponse> {
    let profile = state
        .profile_service()
        .update_child_info(&caller, input)
        .await?;
    Ok(Json(SuccessResponse::new(profile)))
}
