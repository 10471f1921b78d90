use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::profile_dto::{ProfilePayload, ProfileResponse, ProfileUpdateResponse},
    error::{Error, Result},
    middleware::auth::Claims,
    routes::extract::JsonBody,
    AppState,
};

#[utoipa::path(
    get,
    path = "/profile",
    tag = "profile",
    responses(
        (status = 200, description = "Candidate profile, or null when none exists", body = ProfileResponse),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state
        .candidate_service
        .resolve_session_user(&claims.sub, claims.email.as_deref())
        .await?;
    let profile = match user {
        Some(user) => state.candidate_service.get_profile(&user.id).await?,
        None => None,
    };
    Ok(Json(ProfileResponse { profile }))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "profile",
    request_body = ProfilePayload,
    responses(
        (status = 200, description = "Profile saved", body = ProfileUpdateResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<ProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let email = claims
        .email
        .as_deref()
        .ok_or_else(|| Error::BadRequest("session_has_no_email".into()))?;
    let user = state
        .candidate_service
        .ensure_session_user(&claims.sub, email, claims.name.as_deref())
        .await?;
    let profile = state
        .candidate_service
        .upsert_profile(&user.id, payload)
        .await?;
    tracing::info!(user_id = %user.id, candidate_id = profile.id, "profile saved");
    Ok(Json(ProfileUpdateResponse {
        success: true,
        profile,
    }))
}
