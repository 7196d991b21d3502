//! Data access layer (Repository pattern)

pub mod classroom;
pub mod evaluation;
pub mod institution;
pub mod procedures;
pub mod profile;
pub mod student;
pub mod template;

pub use classroom::ClassroomRepository;
pub use evaluation::EvaluationRepository;
pub use institution::InstitutionRepository;
pub use procedures::EvaluationProcedures;
pub use profile::ProfileRepository;
pub use student::StudentRepository;
pub use template::TemplateRepository;
