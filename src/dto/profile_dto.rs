use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::candidate::Candidate;
use crate::utils::validation::{error_with_message, not_blank, url_or_empty};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProfilePayload {
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(custom(function = "url_or_empty"))]
    pub resume_url: Option<String>,
    #[validate(custom(function = "url_or_empty"))]
    pub portfolio_url: Option<String>,
    #[validate(custom(function = "url_or_empty"))]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_skills"))]
    pub skills: Vec<String>,
    #[validate(length(max = 50))]
    pub experience_level: Option<String>,
    #[validate(length(max = 50))]
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: Option<Candidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateResponse {
    pub success: bool,
    pub profile: Candidate,
}

fn validate_skills(skills: &[String]) -> Result<(), ValidationError> {
    if skills.len() > 50 {
        return Err(error_with_message("skills", "at most 50 skills are allowed"));
    }
    if skills.iter().any(|s| s.chars().count() > 50) {
        return Err(error_with_message("skills", "skills must be at most 50 characters"));
    }
    Ok(())
}
