use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::{
        application_dto::SuccessResponse,
        notification_dto::{
            CreateNotificationPayload, MarkAllReadResponse, NotificationCreatedResponse,
            NotificationListQuery, NotificationListResponse,
        },
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::notification::{NewNotification, NotificationType},
    routes::{
        extract::{JsonBody, QueryParams},
        parse_id, session_user_id,
    },
    services::{candidate_service::find_user_by_id, job_service::find_job},
    AppState,
};

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Newest notifications first, with the unread count", body = NotificationListResponse),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    QueryParams(query): QueryParams<NotificationListQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let user_id = session_user_id(&state, &claims).await?;
    let notifications = state
        .notification_service
        .list_for_user(&user_id, query.unread_only.unwrap_or(false), query.limit)
        .await?;
    let unread_count = state.notification_service.unread_count(&user_id).await?;
    Ok(Json(NotificationListResponse {
        notifications,
        unread_count,
    }))
}

#[utoipa::path(
    post,
    path = "/notifications",
    tag = "notifications",
    request_body = CreateNotificationPayload,
    responses(
        (status = 201, description = "Notification created", body = NotificationCreatedResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Only administrators may notify another user"),
        (status = 404, description = "Recipient, job or application not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<CreateNotificationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let notification_type = payload
        .notification_type
        .parse::<NotificationType>()
        .map_err(Error::BadRequest)?;

    if let Some(job_id) = payload.job_id {
        find_job(&state.pool, job_id)
            .await?
            .ok_or_else(|| Error::NotFound("job_not_found".into()))?;
    }
    if let Some(application_id) = payload.application_id {
        state.application_service.get_detail(application_id).await?;
    }

    let recipient = match payload.user_id.as_deref().map(str::trim) {
        Some(target) if !target.is_empty() && target != claims.sub => {
            if !claims.is_admin() {
                return Err(Error::Forbidden("forbidden".into()));
            }
            find_user_by_id(&state.pool, target)
                .await?
                .ok_or_else(|| Error::NotFound("user_not_found".into()))?
                .id
        }
        _ => match claims.email.as_deref() {
            Some(email) => {
                state
                    .candidate_service
                    .ensure_session_user(&claims.sub, email, claims.name.as_deref())
                    .await?
                    .id
            }
            None => find_user_by_id(&state.pool, &claims.sub)
                .await?
                .ok_or_else(|| Error::NotFound("user_not_found".into()))?
                .id,
        },
    };

    let notification = state
        .notification_service
        .create(&NewNotification {
            user_id: recipient,
            notification_type,
            title: payload.title.trim().to_string(),
            message: payload.message.trim().to_string(),
            job_id: payload.job_id,
            application_id: payload.application_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(NotificationCreatedResponse {
            success: true,
            notification,
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    tag = "notifications",
    params(
        ("id" = i64, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked as read", body = SuccessResponse),
        (status = 404, description = "No such notification for this user")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "invalid_notification_id")?;
    let user_id = session_user_id(&state, &claims).await?;
    state.notification_service.mark_read(id, &user_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    patch,
    path = "/notifications/read-all",
    tag = "notifications",
    responses(
        (status = 200, description = "Every unread notification marked as read", body = MarkAllReadResponse)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = session_user_id(&state, &claims).await?;
    let updated = state.notification_service.mark_all_read(&user_id).await?;
    Ok(Json(MarkAllReadResponse {
        success: true,
        updated,
    }))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "notifications",
    params(
        ("id" = i64, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification deleted", body = SuccessResponse),
        (status = 404, description = "No such notification for this user")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id, "invalid_notification_id")?;
    let user_id = session_user_id(&state, &claims).await?;
    state.notification_service.delete(id, &user_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
