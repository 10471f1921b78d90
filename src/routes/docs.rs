use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::dto::{
    application_dto::{
        AdminApplicationsResponse, CandidateApplicationsResponse, StatusUpdatePayload,
        SubmitApplicationResponse, SuccessResponse,
    },
    job_dto::{
        AdminJobListResponse, CreateJobPayload, DeleteJobsPayload, DeleteJobsResponse,
        JobDetailResponse, JobMutationResponse, JobSearchResponse, Pagination, UpdateJobPayload,
    },
    notification_dto::{
        CreateNotificationPayload, MarkAllReadResponse, NotificationCreatedResponse,
        NotificationListResponse,
    },
    profile_dto::{ProfilePayload, ProfileResponse, ProfileUpdateResponse},
    upload_dto::UploadResponse,
};
use crate::models::{
    application::{Application, ApplicationDetail, CandidateApplication},
    candidate::Candidate,
    job::{Job, JobWithApplicationCount},
    notification::Notification,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Job board API"),
    paths(
        crate::routes::health::health,
        crate::routes::jobs::list_jobs,
        crate::routes::jobs::get_job,
        crate::routes::applications::submit_application,
        crate::routes::applications::list_my_applications,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::admin::list_jobs,
        crate::routes::admin::create_job,
        crate::routes::admin::update_job,
        crate::routes::admin::delete_jobs,
        crate::routes::admin::list_applications,
        crate::routes::admin::update_application_status,
        crate::routes::notifications::list_notifications,
        crate::routes::notifications::create_notification,
        crate::routes::notifications::mark_read,
        crate::routes::notifications::mark_all_read,
        crate::routes::notifications::delete_notification,
        crate::routes::upload::upload_file,
    ),
    components(schemas(
        Job,
        JobWithApplicationCount,
        Application,
        ApplicationDetail,
        CandidateApplication,
        Candidate,
        Notification,
        Pagination,
        JobSearchResponse,
        JobDetailResponse,
        AdminJobListResponse,
        JobMutationResponse,
        CreateJobPayload,
        UpdateJobPayload,
        DeleteJobsPayload,
        DeleteJobsResponse,
        SubmitApplicationResponse,
        CandidateApplicationsResponse,
        AdminApplicationsResponse,
        StatusUpdatePayload,
        SuccessResponse,
        ProfilePayload,
        ProfileResponse,
        ProfileUpdateResponse,
        CreateNotificationPayload,
        NotificationListResponse,
        NotificationCreatedResponse,
        MarkAllReadResponse,
        UploadResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "jobs", description = "Public job search"),
        (name = "applications", description = "Job applications"),
        (name = "profile", description = "Candidate profile"),
        (name = "admin", description = "Job and application management"),
        (name = "notifications", description = "In-app notifications"),
        (name = "upload", description = "File uploads")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
