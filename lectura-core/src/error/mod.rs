//! Unified error handling for Lectura Core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// SQLSTATE codes raised by the database procedures via `SIGNAL`
pub mod sqlstate {
    pub const UNAUTHORIZED: &str = "45403";
    pub const NOT_FOUND: &str = "45404";
    pub const CONFLICT: &str = "45409";
    pub const INVALID_INPUT: &str = "45422";
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        fields: Vec<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            message: message.into(),
            fields: vec![field.to_string()],
        }
    }

    /// Stable machine-readable kind, used as the `error` field of responses
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::InvalidInput { .. } => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a store error, turning unique-key violations into `Conflict`.
    pub fn from_store(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::Conflict(conflict_message.to_string());
            }
        }
        AppError::Database(err)
    }

    /// Map a failure raised by a database procedure through its SQLSTATE.
    pub fn from_procedure(err: sqlx::Error) -> Self {
        let (code, message) = match &err {
            sqlx::Error::Database(db_err) => (
                db_err.code().map(|c| c.into_owned()),
                db_err.message().to_string(),
            ),
            _ => (None, String::new()),
        };

        match code.as_deref() {
            Some(sqlstate::UNAUTHORIZED) => AppError::Unauthorized(message),
            Some(sqlstate::NOT_FOUND) => AppError::NotFound(message),
            Some(sqlstate::CONFLICT) => AppError::Conflict(message),
            Some(sqlstate::INVALID_INPUT) => AppError::from_signal_message(message),
            _ => AppError::Database(err),
        }
    }
}

impl AppError {
    /// Build `InvalidInput` from a procedure's `SIGNAL ... MESSAGE_TEXT`.
    /// Procedures prefix the offending column (`"classroom_id: ..."`);
    /// without a prefix the whole request is reported.
    pub(crate) fn from_signal_message(text: String) -> Self {
        match text.split_once(':') {
            Some((field, rest)) if is_column_name(field.trim()) => {
                AppError::invalid_field(field.trim(), rest.trim())
            }
            _ => AppError::invalid_field(SIGNAL_FALLBACK_FIELD, text),
        }
    }
}

const SIGNAL_FALLBACK_FIELD: &str = "request";

fn is_column_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = self.kind();
        let (message, details) = match &self {
            AppError::Unauthenticated(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => (msg.clone(), None),
            AppError::InvalidInput { message, fields } => (
                message.clone(),
                Some(serde_json::json!({ "fields": fields })),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("A database error occurred".to_string(), None)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                ("An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

// Conversion from validation errors; nested item errors report the parent field
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        AppError::InvalidInput {
            message: format!("Invalid fields: {}", fields.join(", ")),
            fields,
        }
    }
}
