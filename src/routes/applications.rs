use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationForm, CandidateApplicationsResponse, SubmitApplicationResponse,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    services::storage_service::{IncomingFile, UploadKind},
    AppState,
};

/// Reads the application form and the optional CV part. Nothing is written.
async fn read_application_form(
    multipart: &mut Multipart,
) -> Result<(ApplicationForm, Option<IncomingFile>)> {
    let mut form = ApplicationForm::default();
    let mut cv = None;
    let mut seen_cv = false;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "job_id" | "jobId" => {
                // An unparseable id is left at zero so validation reports it on job_id.
                form.job_id = field.text().await?.trim().parse().unwrap_or(0);
            }
            "name" => form.name = field.text().await?,
            "email" => form.email = field.text().await?,
            "phone" => form.phone = Some(field.text().await?),
            "cover_letter" | "coverLetter" => form.cover_letter = Some(field.text().await?),
            "cv" => {
                if seen_cv {
                    return Err(Error::BadRequest("Only one cv file may be uploaded".into()));
                }
                seen_cv = true;
                let file_name = field.file_name().unwrap_or("cv").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?;
                if !data.is_empty() {
                    cv = Some(IncomingFile {
                        file_name,
                        content_type,
                        data,
                    });
                }
            }
            other => tracing::debug!(field = other, "ignoring unknown application field"),
        }
    }

    Ok((form.normalized(), cv))
}

#[utoipa::path(
    post,
    path = "/applications",
    tag = "applications",
    responses(
        (status = 201, description = "Application recorded", body = SubmitApplicationResponse),
        (status = 400, description = "Invalid form, rejected CV or duplicate application"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let mut multipart = multipart?;
    let (form, cv) = read_application_form(&mut multipart).await?;
    form.validate()?;
    if let Some(cv) = cv.as_ref() {
        state.storage_service.check(UploadKind::Cv, cv)?;
    }

    let stored = match cv {
        Some(cv) => Some(state.storage_service.store(UploadKind::Cv, cv).await?),
        None => None,
    };
    let cv_url = stored.as_ref().map(|s| s.url.as_str());

    let submitted = match state.application_service.submit(&form, cv_url).await {
        Ok(submitted) => submitted,
        Err(e) => {
            if let Some(url) = cv_url {
                if let Err(cleanup) = state.storage_service.remove(url).await {
                    tracing::warn!(url, error = ?cleanup, "failed to remove orphaned CV");
                }
            }
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmitApplicationResponse {
            success: true,
            application: submitted.application,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/applications",
    tag = "applications",
    responses(
        (status = 200, description = "Applications of the session user", body = CandidateApplicationsResponse),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state
        .candidate_service
        .resolve_session_user(&claims.sub, claims.email.as_deref())
        .await?;
    let applications = match user {
        Some(user) => {
            state
                .application_service
                .list_for_candidate_user(&user.id)
                .await?
        }
        None => Vec::new(),
    };
    Ok(Json(CandidateApplicationsResponse { applications }))
}
