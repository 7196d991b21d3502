//! HTTP server setup

use crate::api;
use crate::config::{Config, ServerConfig};
use crate::jwt::JwtManager;
use crate::middleware::{normalize_error_response, ObservabilityLayer};
use crate::repository::{
    classroom::ClassroomRepositoryImpl, evaluation::EvaluationRepositoryImpl,
    institution::InstitutionRepositoryImpl, procedures::EvaluationProceduresImpl,
    profile::ProfileRepositoryImpl, student::StudentRepositoryImpl,
    template::TemplateRepositoryImpl,
};
use crate::service::{
    ClassroomService, EvaluationService, IdentityResolver, InstitutionService, ProfileService,
    StudentService, TemplateService,
};
use crate::state::HasServices;
use anyhow::Result;
use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Production state backed by MySQL repositories
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub jwt_manager: JwtManager,
    pub identity_resolver: Arc<IdentityResolver<ProfileRepositoryImpl>>,
    pub institution_service: Arc<InstitutionService<InstitutionRepositoryImpl>>,
    pub profile_service: Arc<ProfileService<ProfileRepositoryImpl, InstitutionRepositoryImpl>>,
    pub classroom_service: Arc<ClassroomService<ClassroomRepositoryImpl>>,
    pub student_service: Arc<StudentService<StudentRepositoryImpl, ClassroomRepositoryImpl>>,
    pub template_service: Arc<TemplateService<TemplateRepositoryImpl>>,
    pub evaluation_service: Arc<
        EvaluationService<EvaluationRepositoryImpl, EvaluationProceduresImpl, StudentRepositoryImpl>,
    >,
    pub prometheus_handle: Option<PrometheusHandle>,
}

impl HasServices for AppState {
    type ProfileRepo = ProfileRepositoryImpl;
    type InstitutionRepo = InstitutionRepositoryImpl;
    type ClassroomRepo = ClassroomRepositoryImpl;
    type StudentRepo = StudentRepositoryImpl;
    type TemplateRepo = TemplateRepositoryImpl;
    type EvaluationRepo = EvaluationRepositoryImpl;
    type Procedures = EvaluationProceduresImpl;

    fn config(&self) -> &Config {
        &self.config
    }

    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    fn identity_resolver(&self) -> &IdentityResolver<Self::ProfileRepo> {
        &self.identity_resolver
    }

    fn institution_service(&self) -> &InstitutionService<Self::InstitutionRepo> {
        &self.institution_service
    }

    fn profile_service(&self) -> &ProfileService<Self::ProfileRepo, Self::InstitutionRepo> {
        &self.profile_service
    }

    fn classroom_service(&self) -> &ClassroomService<Self::ClassroomRepo> {
        &self.classroom_service
    }

    fn student_service(&self) -> &StudentService<Self::StudentRepo, Self::ClassroomRepo> {
        &self.student_service
    }

    fn template_service(&self) -> &TemplateService<Self::TemplateRepo> {
        &self.template_service
    }

    fn evaluation_service(
        &self,
    ) -> &EvaluationService<Self::EvaluationRepo, Self::Procedures, Self::StudentRepo> {
        &self.evaluation_service
    }

    fn prometheus_handle(&self) -> Option<&PrometheusHandle> {
        self.prometheus_handle.as_ref()
    }

    async fn check_ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok()
    }
}

/// Connect to the database, wire services and serve HTTP until the process
/// is stopped
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Connected to database");

    let profile_repo = Arc::new(ProfileRepositoryImpl::new(db_pool.clone()));
    let institution_repo = Arc::new(InstitutionRepositoryImpl::new(db_pool.clone()));
    let classroom_repo = Arc::new(ClassroomRepositoryImpl::new(db_pool.clone()));
    let student_repo = Arc::new(StudentRepositoryImpl::new(db_pool.clone()));
    let template_repo = Arc::new(TemplateRepositoryImpl::new(db_pool.clone()));
    let evaluation_repo = Arc::new(EvaluationRepositoryImpl::new(db_pool.clone()));
    let procedures = Arc::new(EvaluationProceduresImpl::new(db_pool.clone()));

    let jwt_manager = JwtManager::new(config.jwt.clone());

    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        jwt_manager,
        identity_resolver: Arc::new(IdentityResolver::new(profile_repo.clone())),
        institution_service: Arc::new(InstitutionService::new(institution_repo.clone())),
        profile_service: Arc::new(ProfileService::new(
            profile_repo.clone(),
            institution_repo.clone(),
        )),
        classroom_service: Arc::new(ClassroomService::new(classroom_repo.clone())),
        student_service: Arc::new(StudentService::new(
            student_repo.clone(),
            classroom_repo.clone(),
        )),
        template_service: Arc::new(TemplateService::new(template_repo)),
        evaluation_service: Arc::new(EvaluationService::new(
            evaluation_repo,
            procedures,
            student_repo,
        )),
        prometheus_handle,
    };

    let app = build_router(state);

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the HTTP router, generic over the state so tests can supply
/// in-memory repositories
pub fn build_router<S: HasServices>(state: S) -> Router {
    let server_config = &state.config().server;
    let cors = cors_layer(server_config);
    let timeout = TimeoutLayer::new(Duration::from_secs(server_config.request_timeout_secs));

    Router::new()
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready::<S>))
        .route("/metrics", get(api::health::metrics::<S>))
        // Caller
        .route("/api/v1/me", get(api::me::get::<S>))
        .route("/api/v1/me/child", put(api::me::update_child::<S>))
        // Institutions
        .route(
            "/api/v1/institutions",
            get(api::institution::list::<S>).post(api::institution::create::<S>),
        )
        .route(
            "/api/v1/institutions/{id}",
            get(api::institution::get::<S>)
                .put(api::institution::update::<S>)
                .delete(api::institution::delete::<S>),
        )
        .route(
            "/api/v1/institutions/{id}/teachers",
            get(api::institution::list_teachers::<S>),
        )
        // Profiles
        .route("/api/v1/users", get(api::user::list::<S>))
        .route("/api/v1/users/{id}", put(api::user::update::<S>))
        // Classrooms
        .route("/api/v1/classrooms", get(api::classroom::list::<S>))
        .route("/api/v1/classrooms/{id}", get(api::classroom::get::<S>))
        .route(
            "/api/v1/classrooms/{id}/teachers/{teacher_id}",
            delete(api::classroom::remove_teacher::<S>),
        )
        // Students
        .route(
            "/api/v1/students/{id}/tutors/{tutor_id}",
            delete(api::student::remove_tutor::<S>),
        )
        .route(
            "/api/v1/students/{id}/attempts",
            get(api::student::attempts::<S>),
        )
        // Templates
        .route(
            "/api/v1/templates/{id}/sequence-items",
            post(api::template::add_sequence_items::<S>),
        )
        .route(
            "/api/v1/templates/{id}/vocabulary-items",
            post(api::template::add_vocabulary_items::<S>),
        )
        // Evaluation sessions
        .route(
            "/api/v1/evaluation-sessions",
            post(api::evaluation::publish::<S>),
        )
        .route(
            "/api/v1/evaluation-sessions/{id}",
            get(api::evaluation::get::<S>),
        )
        .route(
            "/api/v1/evaluation-sessions/{id}/close",
            post(api::evaluation::close::<S>),
        )
        .route(
            "/api/v1/evaluation-sessions/{id}/attempts",
            get(api::evaluation::list_attempts::<S>),
        )
        .route(
            "/api/v1/evaluation-sessions/{id}/attempts/{attempt_id}/code",
            post(api::evaluation::regenerate_code::<S>),
        )
        .route(
            "/api/v1/access-codes/redeem",
            post(api::access_code::redeem::<S>),
        )
        .fallback(|| async { axum::http::StatusCode::NOT_FOUND })
        .layer(axum::middleware::from_fn(normalize_error_response))
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(ObservabilityLayer)
        .layer(cors)
        .with_state(state)
}

