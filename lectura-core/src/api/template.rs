//! Evaluation template content handlers

use super::{SuccessResponse, ValidatedJson};
use crate::domain::{AddSequenceItemsInput, AddVocabularyItemsInput, StringUuid};
use crate::error::Result;
use crate::policy::CallerContext;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn add_sequence_items<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
    ValidatedJson(input): ValidatedJson<AddSequenceItemsInput>,
) -> Result<impl IntoResponse> {
    let items = state
        .template_service()
        .add_sequence_items(&caller, id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(items))))
}

pub async fn add_vocabulary_items<S: HasServices>(
    State(state): State<S>,
    caller: CallerContext,
    Path(id): Path<StringUuid>,
    ValidatedJson(input): ValidatedJson<AddVocabularyItemsInput>,
) -> Result<impl IntoResponse> {
    let items = state
        .template_service()
        .add_vocabulary_items(&caller, id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(items))))
}
