use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;

pub const NOTIFICATION_COLUMNS: &str =
    "id, user_id, type, title, message, read, job_id, application_id, created_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub job_id: Option<i64>,
    pub application_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub job_id: Option<i64>,
    pub application_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    ApplicationStatus,
    NewApplication,
    JobMatch,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ApplicationStatus => "application_status",
            NotificationType::NewApplication => "new_application",
            NotificationType::JobMatch => "job_match",
            NotificationType::System => "system",
        }
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application_status" => Ok(NotificationType::ApplicationStatus),
            "new_application" => Ok(NotificationType::NewApplication),
            "job_match" => Ok(NotificationType::JobMatch),
            "system" => Ok(NotificationType::System),
            other => Err(format!("unknown notification type: {}", other)),
        }
    }
}
