//! Classroom API handlers

use super::{MessageResponse, SuccessResponse};
use crate::domain::{ClassroomListQuery, StringUuid};
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
    Query(query): Query<ClassroomListQuery>,
) -> Result<impl IntoResponse> {
    let classrooms = state.classroom_service().list(&caller, query).await?;
    Ok(Json(SuccessResponse::new(classrooms)))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
) -> Result<impl IntoResponse> {
    let classroom = state.classroom_service().get(&caller, id).await?;
    Ok(Json(SuccessResponse::new(classroom)))
}

pub async fn remove_teacher<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path((classroom_id, teacher_id)): Path<(StringUuid, StringUuid)>,
) -> Result<impl IntoResponse> {
    state
        .classroom_service()
        .remove_teacher(&caller, classroom_id, teacher_id)
        .await?;
    Ok(Json(MessageResponse::new("Teacher removed from classroom")))
}
