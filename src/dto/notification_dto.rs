use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::notification::{Notification, NotificationType};
use crate::utils::validation::{error_with_message, not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateNotificationPayload {
    /// Recipient; defaults to the caller. Only admins may target another user.
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_notification_type"))]
    pub notification_type: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000), custom(function = "not_blank"))]
    pub message: String,
    pub job_id: Option<i64>,
    pub application_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct NotificationListQuery {
    pub unread_only: Option<bool>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationCreatedResponse {
    pub success: bool,
    pub notification: Notification,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub success: bool,
    pub updated: u64,
}

fn validate_notification_type(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<NotificationType>()
        .map(|_| ())
        .map_err(|_| {
            error_with_message(
                "notification_type",
                "must be one of application_status, new_application, job_match, system",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_is_rejected() {
        let payload = CreateNotificationPayload {
            user_id: None,
            notification_type: "marketing".into(),
            title: "Hello".into(),
            message: "World".into(),
            job_id: None,
            application_id: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn type_is_read_from_type_key() {
        let payload: CreateNotificationPayload = serde_json::from_value(serde_json::json!({
            "type": "system",
            "title": "Maintenance",
            "message": "Tonight at 22:00"
        }))
        .unwrap();
        assert_eq!(payload.notification_type, "system");
        assert!(payload.validate().is_ok());
    }
}
