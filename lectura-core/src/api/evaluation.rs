//! Evaluation session lifecycle handlers

use super::{SuccessResponse, ValidatedJson};
use crate::domain::{PublishSessionInput, StringUuid};
use crate::error::Result;
use crate::policy::CallerContext;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn publish<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    ValidatedJson(input): ValidatedJson<PublishSessionInput>,
) -> Result<impl IntoResponse> {
    let session = state.evaluation_service().publish(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(session))))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let session = state.evaluation_service().get_session(&caller, id).await?;
    Ok(Json(SuccessResponse::new(session)))
}

pub async fn close<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let session = state.evaluation_service().close(&caller, id).await?;
    Ok(Json(SuccessResponse::new(session)))
}

/// Attempt roster; codes themselves are never listed
pub async fn list_attempts<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let attempts = state
        .evaluation_service()
        .list_attempt_codes(&caller, id)
        .await?;
    Ok(Json(SuccessResponse::new(attempts)))
}

/// Returns the new plaintext code once; the previous code stops working
pub async fn regenerate_code<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path((session_id, attempt_id)): Path<(StringUuid, StringUuid)>,
) -> Result<impl IntoResponse> {
    let issued = state
        .evaluation_service()
        .regenerate_code(&caller, session_id, attempt_id)
        .await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(issued))))
}
