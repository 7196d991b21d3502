//! Request body extraction with taxonomy-shaped rejections

use crate::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// `Json<T>` whose rejections are reported as `InvalidInput` instead of
/// axum's plain-text bodies. Parser positions are logged, not returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "Rejected JSON body");
                Err(rejection_to_error(&rejection))
            }
        }
    }
}

/// Reported field for rejections of the request body as a whole
const BODY_FIELD: &str = "body";

fn rejection_to_error(rejection: &JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::JsonDataError(_) => "Request body does not match the expected shape",
        _ => "Request body could not be read",
    };
    AppError::InvalidInput {
        message: message.to_string(),
        fields: vec![BODY_FIELD.to_string()],
    }
}
