use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::upload_dto::UploadResponse,
    error::{Error, Result},
    middleware::auth::Claims,
    services::storage_service::{IncomingFile, UploadKind},
    AppState,
};

#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    responses(
        (status = 201, description = "File stored and served under /uploads", body = UploadResponse),
        (status = 400, description = "Missing, oversized or disallowed file"),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let mut multipart = multipart?;
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(Error::BadRequest("Only one file may be uploaded".into()));
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;
        file = Some(IncomingFile {
            file_name,
            content_type,
            data,
        });
    }

    let file = file.ok_or_else(|| Error::BadRequest("No file provided".into()))?;
    let stored = state.storage_service.store(UploadKind::Generic, file).await?;
    tracing::info!(user_id = %claims.sub, url = %stored.url, "file uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            url: stored.url,
            filename: stored.file_name,
            content_type: stored.content_type,
        }),
    ))
}
