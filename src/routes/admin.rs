use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::{
        application_dto::{AdminApplicationsQuery, AdminApplicationsResponse, StatusUpdatePayload, SuccessResponse},
        job_dto::{
            AdminJobListResponse, CreateJobPayload, DeleteJobsPayload, DeleteJobsResponse,
            JobMutationResponse, UpdateJobPayload,
        },
    },
    error::{Error, Result},
    middleware::auth::Claims,
    routes::{
        extract::{JsonBody, QueryParams},
        parse_id,
    },
    AppState,
};

#[utoipa::path(
    get,
    path = "/admin/jobs",
    tag = "admin",
    responses(
        (status = 200, description = "Every job with its application count", body = AdminJobListResponse),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Not an administrator")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_with_counts().await?;
    Ok(Json(AdminJobListResponse { jobs }))
}

#[utoipa::path(
    post,
    path = "/admin/jobs",
    tag = "admin",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created", body = JobMutationResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not an administrator")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate_all()?;
    let owner = state
        .candidate_service
        .resolve_session_user(&claims.sub, claims.email.as_deref())
        .await?;
    let job = state
        .job_service
        .create(payload, owner.as_ref().map(|u| u.id.as_str()))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(JobMutationResponse { success: true, job }),
    ))
}

#[utoipa::path(
    put,
    path = "/admin/jobs",
    tag = "admin",
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = JobMutationResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate_all()?;
    let job = state.job_service.update(payload).await?;
    Ok(Json(JobMutationResponse { success: true, job }))
}

#[utoipa::path(
    delete,
    path = "/admin/jobs",
    tag = "admin",
    request_body = DeleteJobsPayload,
    responses(
        (status = 200, description = "Jobs and their applications deleted", body = DeleteJobsResponse),
        (status = 400, description = "Empty id list"),
        (status = 404, description = "At least one id is unknown, nothing was deleted")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_jobs(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<DeleteJobsPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let deleted_count = state.job_service.delete_many(&payload.ids).await?;
    Ok(Json(DeleteJobsResponse {
        success: true,
        deleted_count,
    }))
}

#[utoipa::path(
    get,
    path = "/admin/applications",
    tag = "admin",
    params(AdminApplicationsQuery),
    responses(
        (status = 200, description = "Applications with job and candidate details", body = AdminApplicationsResponse),
        (status = 400, description = "Invalid filters")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AdminApplicationsQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let applications = state.application_service.list_all(&query).await?;
    Ok(Json(AdminApplicationsResponse { applications }))
}

#[utoipa::path(
    patch,
    path = "/admin/applications/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    request_body = StatusUpdatePayload,
    responses(
        (status = 200, description = "Status changed", body = SuccessResponse),
        (status = 400, description = "Invalid id or status"),
        (status = 404, description = "Application not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<StatusUpdatePayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "invalid_application_id")?;
    payload.validate()?;
    let status = payload
        .parsed()
        .ok_or_else(|| Error::BadRequest("invalid_status".into()))?;
    // Any recognised status may replace any other, so admins can undo a decision.
    state.application_service.update_status(id, status).await?;
    Ok(Json(SuccessResponse { success: true }))
}
