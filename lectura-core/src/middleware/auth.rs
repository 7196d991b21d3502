//! Session token authentication and caller resolution
//!
//! `CallerContext` is extracted once per request: the bearer token is
//! verified, its subject is resolved to a profile, and the result is passed
//! explicitly into every service call.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::domain::StringUuid;
use crate::error::AppError;
use crate::policy::CallerContext;
use crate::state::HasServices;

/// Extract the token from an `Authorization: Bearer <token>` header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization token".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::Unauthenticated(
                "Authorization header must use Bearer scheme".to_string(),
            )
        })?;
    Ok(token)
}

impl<S> FromRequestParts<S> for CallerContext
where
    S: HasServices,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = state.jwt_manager().verify_session_token(token)?;
        let user_id = claims
            .subject_id()
            .map(StringUuid::from)
            .ok_or_else(|| AppError::Unauthenticated("Invalid token subject".to_string()))?;

        match state.identity_resolver().resolve(user_id).await {
            Some(profile) => Ok(CallerContext::new(profile)),
            None => {
                debug!(user_id = %user_id, "Authenticated user has no usable profile");
                Err(AppError::Unauthorized(
                    "No profile is associated with this account".to_string(),
                ))
            }
        }
    }
}
