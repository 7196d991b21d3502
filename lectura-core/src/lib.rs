//! Lectura Core - policy and access layer for school reading evaluations
//!
//! Resolves the calling profile, applies the role policy guard and serves
//! scoped reads and writes over institutions, classrooms, students,
//! templates and evaluation sessions.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod policy;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
