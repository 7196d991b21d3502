//! Profile directory API handlers

use super::{SuccessResponse, ValidatedJson};
use crate::domain::{ProfileFilter, StringUuid, UpdateProfileInput};
use crate::error::Result;
use crate::policy::CallerContext;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

pub async fn list<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Query(filter): Query<ProfileFilter>,
) -> Result<impl IntoResponse> {
    let profiles = state.profile_service().list(&caller, filter).await?;
    Ok(Json(SuccessResponse::new(profiles)))
}

/// Change another profile's role and institution
pub async fn update<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
    ValidatedJson(input): ValidatedJson<UpdateProfileInput>,
) -> Result<impl IntoResponse> {
    let profile = state
        .profile_service()
        .update_assignment(&caller, id, input)
        .await?;
    Ok(Json(SuccessResponse::new(profile)))
}
