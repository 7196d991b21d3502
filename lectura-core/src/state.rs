//! Application state traits for dependency injection
//!
//! Handlers are generic over [`HasServices`] so the same routing code runs
//! against the MySQL-backed `AppState` and the in-memory state used by the
//! HTTP tests.

use crate::config::Config;
use crate::jwt::JwtManager;
use crate::repository::{
    ClassroomRepository, EvaluationProcedures, EvaluationRepository, InstitutionRepository,
    ProfileRepository, StudentRepository, TemplateRepository,
};
use crate::service::{
    ClassroomService, EvaluationService, IdentityResolver, InstitutionService, ProfileService,
    StudentService, TemplateService,
};
use metrics_exporter_prometheus::PrometheusHandle;

pub trait HasServices: Clone + Send + Sync + 'static {
    type ProfileRepo: ProfileRepository;
    type InstitutionRepo: InstitutionRepository;
    type ClassroomRepo: ClassroomRepository;
    type StudentRepo: StudentRepository;
    type TemplateRepo: TemplateRepository;
    type EvaluationRepo: EvaluationRepository;
    /// Stored procedures backing the session lifecycle writes
    type Procedures: EvaluationProcedures;

    fn config(&self) -> &Config;

    fn jwt_manager(&self) -> &JwtManager;

    /// Maps an authenticated user id to its profile
    fn identity_resolver(&self) -> &IdentityResolver<Self::ProfileRepo>;

    fn institution_service(&self) -> &InstitutionService<Self::InstitutionRepo>;

    fn profile_service(&self) -> &ProfileService<Self::ProfileRepo, Self::InstitutionRepo>;

    fn classroom_service(&self) -> &ClassroomService<Self::ClassroomRepo>;

    fn student_service(&self) -> &StudentService<Self::StudentRepo, Self::ClassroomRepo>;

    fn template_service(&self) -> &TemplateService<Self::TemplateRepo>;

    fn evaluation_service(
        &self,
    ) -> &EvaluationService<Self::EvaluationRepo, Self::Procedures, Self::StudentRepo>;

    /// Prometheus handle, present when metrics are enabled
    fn prometheus_handle(&self) -> Option<&PrometheusHandle>;

    /// Database reachability for the readiness probe
    fn check_ready(&self) -> impl std::future::Future<Output = bool> + Send;
}
