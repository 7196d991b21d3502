//! HTTP middleware: caller extraction, error normalization and request
//! observability

pub mod auth;
pub mod error_response;
pub mod metrics;

pub use error_response::normalize_error_response;
pub use metrics::ObservabilityLayer;
