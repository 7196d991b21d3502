//! Business logic layer

pub mod access_code;
pub mod classroom;
pub mod evaluation;
pub mod identity;
pub mod institution;
pub mod profile;
pub mod student;
pub mod template;

pub use classroom::ClassroomService;
pub use evaluation::EvaluationService;
pub use identity::IdentityResolver;
pub use institution::InstitutionService;
pub use profile::ProfileService;
pub use student::StudentService;
pub use template::TemplateService;
