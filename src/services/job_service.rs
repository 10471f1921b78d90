use crate::dto::job_dto::{
    non_empty, normalize_tags, CreateJobPayload, JobSearchQuery, JobSearchResponse, Pagination,
    UpdateJobPayload,
};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobStatus, JobWithApplicationCount, JOB_COLUMNS};
use crate::utils::validation::check_salary_range;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use validator::ValidationErrors;

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Public search over active, unexpired jobs.
    pub async fn search(&self, query: &JobSearchQuery) -> Result<JobSearchResponse> {
        let page = query.page();
        let limit = query.limit();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        push_search_filters(&mut count_query, query);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut items_query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM jobs", JOB_COLUMNS));
        push_search_filters(&mut items_query, query);
        items_query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(query.offset());
        let jobs = items_query
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await?;

        Ok(JobSearchResponse {
            jobs,
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Job> {
        find_job(&self.pool, id)
            .await?
            .ok_or_else(|| Error::NotFound("job_not_found".into()))
    }

    /// Increments the view counter in the background; the caller never waits on it.
    pub fn record_view(&self, id: i64) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let res = sqlx::query("UPDATE jobs SET views = views + 1 WHERE id = $1")
                .bind(id)
                .execute(&pool)
                .await;
            if let Err(e) = res {
                tracing::warn!(job_id = id, error = %e, "failed to record job view");
            }
        });
    }

    pub async fn list_with_counts(&self) -> Result<Vec<JobWithApplicationCount>> {
        let sql = format!(
            "SELECT {},
                (SELECT COUNT(*) FROM applications a WHERE a.job_id = jobs.id) AS application_count
             FROM jobs
             ORDER BY created_at DESC, id DESC",
            JOB_COLUMNS
        );
        let items = sqlx::query_as::<_, JobWithApplicationCount>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn create(&self, payload: CreateJobPayload, owner_id: Option<&str>) -> Result<Job> {
        let status = payload
            .status
            .clone()
            .unwrap_or_else(|| JobStatus::Active.as_str().to_string());
        let sql = format!(
            "INSERT INTO jobs (
                title, company, location, contract_type, salary_min, salary_max, currency,
                description, requirements, benefits, company_website, company_logo,
                remote, tags, status, expires_at, user_id
             ) VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17
             )
             RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(payload.title.trim())
            .bind(payload.company.trim())
            .bind(payload.location.trim())
            .bind(&payload.contract_type)
            .bind(payload.salary_min)
            .bind(payload.salary_max)
            .bind(&payload.currency)
            .bind(&payload.description)
            .bind(payload.requirements.clone().and_then(non_empty))
            .bind(payload.benefits.clone().and_then(non_empty))
            .bind(payload.company_website.clone().and_then(non_empty))
            .bind(payload.company_logo.clone().and_then(non_empty))
            .bind(payload.remote)
            .bind(normalize_tags(payload.tags.clone()))
            .bind(status)
            .bind(payload.expires_at)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(job_id = job.id, title = %job.title, "job created");
        Ok(job)
    }

    /// Applies a partial update. Fields absent from the payload keep their stored values.
    pub async fn update(&self, payload: UpdateJobPayload) -> Result<Job> {
        let id = payload.id;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM jobs WHERE id = $1 FOR UPDATE", JOB_COLUMNS);
        let existing = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("job_not_found".into()))?;

        let merged = payload.apply_to(existing);
        let mut errors = ValidationErrors::new();
        check_salary_range(merged.salary_min, merged.salary_max, &mut errors);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let sql = format!(
            "UPDATE jobs SET
                title = $2, company = $3, location = $4, contract_type = $5,
                salary_min = $6, salary_max = $7, currency = $8, description = $9,
                requirements = $10, benefits = $11, company_website = $12, company_logo = $13,
                remote = $14, tags = $15, status = $16, expires_at = $17, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(merged.id)
            .bind(&merged.title)
            .bind(&merged.company)
            .bind(&merged.location)
            .bind(&merged.contract_type)
            .bind(merged.salary_min)
            .bind(merged.salary_max)
            .bind(&merged.currency)
            .bind(&merged.description)
            .bind(&merged.requirements)
            .bind(&merged.benefits)
            .bind(&merged.company_website)
            .bind(&merged.company_logo)
            .bind(merged.remote)
            .bind(&merged.tags)
            .bind(&merged.status)
            .bind(merged.expires_at)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(job_id = job.id, "job updated");
        Ok(job)
    }

    /// Deletes a batch of jobs and their applications. If any id is unknown nothing is deleted.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut tx = self.pool.begin().await?;
        let found: Vec<i64> =
            sqlx::query_scalar::<_, i64>("SELECT id FROM jobs WHERE id = ANY($1) FOR UPDATE")
                .bind(&ids)
                .fetch_all(&mut *tx)
                .await?;

        let missing = missing_ids(&ids, &found);
        if !missing.is_empty() {
            tracing::info!(?missing, "job batch delete rejected");
            return Err(Error::NotFound(format!(
                "job_not_found: {}",
                missing
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let removed_applications = sqlx::query("DELETE FROM applications WHERE job_id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM jobs WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        tracing::info!(deleted, removed_applications, "jobs deleted");
        Ok(deleted)
    }
}

pub async fn find_job<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Option<Job>> {
    let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(job)
}

fn push_search_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &JobSearchQuery) {
    builder
        .push(" WHERE status = ")
        .push_bind(JobStatus::Active.as_str())
        .push(" AND (expires_at IS NULL OR expires_at > NOW())");

    if let Some(search) = trimmed(&query.search) {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(location) = trimmed(&query.location) {
        builder
            .push(" AND location ILIKE ")
            .push_bind(format!("%{}%", escape_like(location)));
    }
    if let Some(contract_type) = trimmed(&query.contract_type) {
        builder
            .push(" AND contract_type = ")
            .push_bind(contract_type.to_string());
    }
    if let Some(salary_min) = query.salary_min {
        builder
            .push(" AND COALESCE(salary_max, salary_min) >= ")
            .push_bind(salary_min);
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn missing_ids(requested: &[i64], found: &[i64]) -> Vec<i64> {
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}
