//! Student access code redemption (no session token)

use super::{SuccessResponse, ValidatedJson};
use crate::domain::RedeemAccessCodeInput;
use crate::error::Result;
use crate::state::HasServices;
use axum::{extract::State, response::IntoResponse, Json};

pub async fn redeem<S: HasServices>(
    State(state): State<S>,
    ValidatedJson(input): ValidatedJson<RedeemAccessCodeInput>,
) -> Result<impl IntoResponse> {
    let redemption = state.evaluation_service().redeem_code(input).await?;
    Ok(Json(SuccessResponse::new(redemption)))
}
