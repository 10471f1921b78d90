pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    auth::{require_admin, require_session},
    cors::cors_layer,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::services::{
    application_service::ApplicationService, candidate_service::CandidateService,
    job_service::JobService, notification_service::NotificationService,
    storage_service::{StorageService, UPLOAD_MAX_BYTES},
};

/// Multipart framing on top of the largest accepted file.
const BODY_LIMIT_BYTES: usize = UPLOAD_MAX_BYTES + 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub candidate_service: CandidateService,
    pub notification_service: NotificationService,
    pub storage_service: StorageService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let notification_service = NotificationService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let application_service =
            ApplicationService::new(pool.clone(), notification_service.clone());
        let candidate_service = CandidateService::new(pool.clone());
        let storage_service = StorageService::new(config.uploads_dir.clone());

        Self {
            pool,
            job_service,
            application_service,
            candidate_service,
            notification_service,
            storage_service,
        }
    }
}

/// Builds the HTTP application. Authentication middleware reads the global config,
/// so `config::init_config` must have run first.
pub fn app(state: AppState, config: &Config) -> Router {
    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/jobs", get(routes::jobs::list_jobs))
        .route("/jobs/:id", get(routes::jobs::get_job))
        .route(
            "/applications",
            post(routes::applications::submit_application),
        )
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    let session_api = Router::new()
        .route(
            "/applications",
            get(routes::applications::list_my_applications),
        )
        .route(
            "/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route(
            "/notifications",
            get(routes::notifications::list_notifications)
                .post(routes::notifications::create_notification),
        )
        .route(
            "/notifications/read-all",
            patch(routes::notifications::mark_all_read),
        )
        .route(
            "/notifications/:id",
            delete(routes::notifications::delete_notification),
        )
        .route(
            "/notifications/:id/read",
            patch(routes::notifications::mark_read),
        )
        .route("/upload", post(routes::upload::upload_file))
        .route_layer(axum::middleware::from_fn(require_session))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    let admin_api = Router::new()
        .route(
            "/admin/jobs",
            get(routes::admin::list_jobs)
                .post(routes::admin::create_job)
                .put(routes::admin::update_job)
                .delete(routes::admin::delete_jobs),
        )
        .route(
            "/admin/applications",
            get(routes::admin::list_applications),
        )
        .route(
            "/admin/applications/:id",
            patch(routes::admin::update_application_status),
        )
        .route_layer(axum::middleware::from_fn(require_admin))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(config.admin_rps),
            rps_middleware,
        ));

    tracing::info!(dir = %config.uploads_dir.display(), "serving uploads");

    Router::new()
        .merge(public_api)
        .merge(session_api)
        .merge(admin_api)
        .route(
            "/api-docs/openapi.json",
            get(routes::docs::openapi_json),
        )
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
}
