use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::application::{
    Application, ApplicationDetail, ApplicationStatus, CandidateApplication,
};
use crate::utils::validation::{error_with_message, not_blank};

pub const COVER_LETTER_MAX: u64 = 1000;

/// Text fields of a multipart application submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ApplicationForm {
    #[validate(range(min = 1, message = "job_id must be a positive integer"))]
    pub job_id: i64,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 1000, message = "Cover letter must be at most 1000 characters"))]
    pub cover_letter: Option<String>,
}

impl ApplicationForm {
    /// Trims text, lowercases the email and drops blank optional fields.
    pub fn normalized(self) -> Self {
        Self {
            job_id: self.job_id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_ascii_lowercase(),
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            cover_letter: self
                .cover_letter
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitApplicationResponse {
    pub success: bool,
    pub application: Application,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateApplicationsResponse {
    pub applications: Vec<CandidateApplication>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminApplicationsResponse {
    pub applications: Vec<ApplicationDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct AdminApplicationsQuery {
    #[validate(custom(function = "validate_application_status"))]
    pub status: Option<String>,
    #[validate(range(min = 1))]
    pub job_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StatusUpdatePayload {
    #[validate(custom(function = "validate_application_status"))]
    pub status: String,
}

impl StatusUpdatePayload {
    pub fn parsed(&self) -> Option<ApplicationStatus> {
        self.status.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

fn validate_application_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<ApplicationStatus>()
        .map(|_| ())
        .map_err(|_| {
            error_with_message(
                "status",
                "must be one of pending, reviewing, reviewed, interview, accepted, rejected",
            )
        })
}
