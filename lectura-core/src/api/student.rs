//! Student API handlers

use super::{MessageResponse, SuccessResponse};
use crate::domain::StringUuid;
use crate::error::Result;
use crate::policy::CallerContext;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

pub async fn remove_tutor<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path((student_id, tutor_id)): Path<(StringUuid, StringUuid)>,
) -> Result<impl IntoResponse> {
    state
        .student_service()
        .remove_tutor(&caller, student_id, tutor_id)
        .await?;
    Ok(Json(MessageResponse::new("Tutor assignment removed")))
}

/// Attempt history of a student, newest first
pub async fn attempts<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(student_id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let history = state
        .evaluation_service()
        .student_history(&caller, student_id)
        .await?;
    Ok(Json(SuccessResponse::new(history)))
}
