use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::job_dto::{JobDetailResponse, JobSearchQuery, JobSearchResponse},
    error::Result,
    routes::{extract::QueryParams, parse_id},
    AppState,
};

#[utoipa::path(
    get,
    path = "/jobs",
    tag = "jobs",
    params(JobSearchQuery),
    responses(
        (status = 200, description = "Active jobs matching the filters", body = JobSearchResponse),
        (status = 400, description = "Invalid filters")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<JobSearchQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let result = state.job_service.search(&query).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = i64, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = JobDetailResponse),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "invalid_job_id")?;
    let job = state.job_service.get_by_id(id).await?;
    state.job_service.record_view(job.id);
    Ok(Json(JobDetailResponse { job }))
}
