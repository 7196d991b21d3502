//! Error response normalization middleware
//!
//! Framework rejections (unparseable path ids, unknown routes, wrong
//! methods) come back as `text/plain`. This rewrites them into the same
//! `{ "error", "message" }` body that `AppError` produces.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

const PROBE_PATHS: [&str; 3] = ["/health", "/ready", "/metrics"];

pub async fn normalize_error_response(request: Request<Body>, next: Next) -> Response {
    let is_probe = PROBE_PATHS.contains(&request.uri().path());
    let response = next.run(request).await;
    let status = response.status();

    if is_probe || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    generic_error_response(status)
}

fn generic_error_response(status: StatusCode) -> Response {
    let (kind, message) = match status {
        StatusCode::BAD_REQUEST => ("invalid_input", "Invalid request"),
        StatusCode::UNAUTHORIZED => ("unauthenticated", "Authentication required"),
        StatusCode::FORBIDDEN => ("unauthorized", "Access denied"),
        StatusCode::NOT_FOUND => ("not_found", "Not found"),
        StatusCode::METHOD_NOT_ALLOWED => ("method_not_allowed", "Method not allowed"),
        StatusCode::CONFLICT => ("conflict", "Resource conflict"),
        StatusCode::REQUEST_TIMEOUT => ("timeout", "Request timed out"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            ("unsupported_media_type", "Unsupported content type")
        }
        StatusCode::UNPROCESSABLE_ENTITY => ("invalid_input", "Invalid request"),
        _ if status.is_client_error() => ("client_error", "Client error"),
        _ => ("internal_error", "An internal error occurred"),
    };

    (
        status,
        axum::Json(json!({
            "error": kind,
            "message": message,
        })),
    )
        .into_response()
}
