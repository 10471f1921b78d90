use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::job::{ContractType, Job, JobStatus, JobWithApplicationCount};
use crate::utils::validation::{
    check_salary_range, error_with_message, not_blank, url_or_empty, validate_with,
};

pub const TEXT_FIELD_MAX: u64 = 100;
pub const LONG_TEXT_MAX: u64 = 5000;
pub const MAX_PAGE_SIZE: i64 = 50;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE: i64 = 1_000_000;

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub company: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub location: String,
    #[validate(custom(function = "validate_contract_type"))]
    pub contract_type: String,
    #[validate(range(min = 0, message = "salary_min must be a non-negative integer"))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 0, message = "salary_max must be a non-negative integer"))]
    pub salary_max: Option<i32>,
    #[serde(default = "default_currency")]
    #[validate(length(min = 1, max = 10))]
    pub currency: String,
    #[validate(length(min = 1, max = 5000), custom(function = "not_blank"))]
    pub description: String,
    #[validate(length(max = 5000))]
    pub requirements: Option<String>,
    #[validate(length(max = 5000))]
    pub benefits: Option<String>,
    #[validate(custom(function = "url_or_empty"))]
    pub company_website: Option<String>,
    #[validate(custom(function = "url_or_empty"))]
    pub company_logo: Option<String>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
    #[validate(custom(function = "validate_job_status"))]
    pub status: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateJobPayload {
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        validate_with(self, |errors| {
            check_salary_range(self.salary_min, self.salary_max, errors)
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateJobPayload {
    #[validate(range(min = 1, message = "id must be a positive integer"))]
    pub id: i64,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_contract_type"))]
    pub contract_type: Option<String>,
    #[validate(range(min = 0, message = "salary_min must be a non-negative integer"))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 0, message = "salary_max must be a non-negative integer"))]
    pub salary_max: Option<i32>,
    #[validate(length(min = 1, max = 10))]
    pub currency: Option<String>,
    #[validate(length(min = 1, max = 5000), custom(function = "not_blank"))]
    pub description: Option<String>,
    #[validate(length(max = 5000))]
    pub requirements: Option<String>,
    #[validate(length(max = 5000))]
    pub benefits: Option<String>,
    #[validate(custom(function = "url_or_empty"))]
    pub company_website: Option<String>,
    #[validate(custom(function = "url_or_empty"))]
    pub company_logo: Option<String>,
    pub remote: Option<bool>,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
    #[validate(custom(function = "validate_job_status"))]
    pub status: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UpdateJobPayload {
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        validate_with(self, |errors| {
            check_salary_range(self.salary_min, self.salary_max, errors)
        })
    }

    /// Overlays the fields present in the payload onto the stored row.
    pub fn apply_to(self, mut job: Job) -> Job {
        if let Some(title) = self.title {
            job.title = title.trim().to_string();
        }
        if let Some(company) = self.company {
            job.company = company.trim().to_string();
        }
        if let Some(location) = self.location {
            job.location = location.trim().to_string();
        }
        if let Some(contract_type) = self.contract_type {
            job.contract_type = contract_type;
        }
        if self.salary_min.is_some() {
            job.salary_min = self.salary_min;
        }
        if self.salary_max.is_some() {
            job.salary_max = self.salary_max;
        }
        if let Some(currency) = self.currency {
            job.currency = currency;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(requirements) = self.requirements {
            job.requirements = non_empty(requirements);
        }
        if let Some(benefits) = self.benefits {
            job.benefits = non_empty(benefits);
        }
        if let Some(website) = self.company_website {
            job.company_website = non_empty(website);
        }
        if let Some(logo) = self.company_logo {
            job.company_logo = non_empty(logo);
        }
        if let Some(remote) = self.remote {
            job.remote = remote;
        }
        if let Some(tags) = self.tags {
            job.tags = normalize_tags(tags);
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if self.expires_at.is_some() {
            job.expires_at = self.expires_at;
        }
        job
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DeleteJobsPayload {
    #[validate(length(min = 1, message = "at least one id is required"))]
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct JobSearchQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_contract_type"))]
    pub contract_type: Option<String>,
    #[validate(range(min = 0, message = "salary_min must be a non-negative integer"))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 1, max = 1_000_000, message = "page must be between 1 and 1000000"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    pub limit: Option<i64>,
}

impl JobSearchQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total_count: i64) -> Self {
        let total_pages = if limit > 0 {
            (total_count + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobSearchResponse {
    pub jobs: Vec<Job>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobDetailResponse {
    pub job: Job,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminJobListResponse {
    pub jobs: Vec<JobWithApplicationCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobMutationResponse {
    pub success: bool,
    pub job: Job,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJobsResponse {
    pub success: bool,
    pub deleted_count: u64,
}

pub fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn validate_contract_type(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<ContractType>()
        .map(|_| ())
        .map_err(|_| error_with_message("contract_type", "must be one of CDI, CDD, Stage, Freelance"))
}

fn validate_job_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<JobStatus>()
        .map(|_| ())
        .map_err(|_| error_with_message("job_status", "must be one of active, paused, closed"))
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > 20 {
        return Err(error_with_message("tags", "at most 20 tags are allowed"));
    }
    if tags.iter().any(|t| t.chars().count() > 50) {
        return Err(error_with_message("tags", "tags must be at most 50 characters"));
    }
    Ok(())
}
