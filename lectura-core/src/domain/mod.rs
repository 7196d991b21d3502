//! Domain models for Lectura Core

pub mod classroom;
pub mod common;
pub mod evaluation;
pub mod institution;
pub mod profile;
pub mod student;
pub mod template;

pub use classroom::*;
pub use common::*;
pub use evaluation::*;
pub use institution::*;
pub use profile::*;
pub use student::*;
pub use template::*;
