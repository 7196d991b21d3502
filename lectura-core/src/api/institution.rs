//! Institution API handlers

use super::{MessageResponse, SuccessResponse, ValidatedJson};
use crate::domain::{CreateInstitutionInput, StringUuid, UpdateInstitutionInput};
use crate::error::Result;
use crate::policy::CallerContext;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn list<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
) -> Result<impl IntoResponse> {
    let institutions = state.institution_service().list(&caller).await?;
    Ok(Json(SuccessResponse::new(institutions)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let institution = state.institution_service().get(&caller, id).await?;
    Ok(Json(SuccessResponse::new(institution)))
}

pub async fn create<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    ValidatedJson(input): ValidatedJson<CreateInstitutionInput>,
) -> Result<impl IntoResponse> {
    let institution = state.institution_service().create(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(institution))))
}

pub async fn update<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
    ValidatedJson(input): ValidatedJson<UpdateInstitutionInput>,
) -> Result<impl IntoResponse> {
    let institution = state
        .institution_service()
        .update(&caller, id, input)
        .await?;
    Ok(Json(SuccessResponse::new(institution)))
}

/// Soft delete; the id is never reused
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    state.institution_service().delete(&caller, id).await?;
    Ok(Json(MessageResponse::new("Institution deleted successfully")))
}

pub async fn list_teachers<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let teachers = state.profile_service().list_teachers(&caller, id).await?;
    Ok(Json(SuccessResponse::new(teachers)))
}
