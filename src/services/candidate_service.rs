use crate::dto::job_dto::non_empty;
use crate::dto::profile_dto::ProfilePayload;
use crate::error::Result;
use crate::models::candidate::{split_full_name, Candidate};
use crate::models::user::{Role, User};
use sqlx::{PgExecutor, PgPool};

pub const USER_COLUMNS: &str = "id, email, name, role, created_at, updated_at";
pub const CANDIDATE_COLUMNS: &str = "id, user_id, first_name, last_name, phone, location, bio, resume_url, portfolio_url, linkedin_url, skills, experience_level, availability, created_at, updated_at";

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the stored user behind a session, by id first and then by email.
    /// Users created lazily by an application carry a generated id, so the email
    /// fallback links them to the identity provider account.
    pub async fn resolve_session_user(&self, user_id: &str, email: Option<&str>) -> Result<Option<User>> {
        if let Some(user) = find_user_by_id(&self.pool, user_id).await? {
            return Ok(Some(user));
        }
        match email {
            Some(email) => find_user_by_email(&self.pool, &email.to_ascii_lowercase()).await,
            None => Ok(None),
        }
    }

    pub async fn ensure_session_user(
        &self,
        user_id: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<User> {
        if let Some(user) = self.resolve_session_user(user_id, Some(email)).await? {
            return Ok(user);
        }
        let sql = format!(
            "INSERT INTO users_sync (id, email, name, role)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(email.to_ascii_lowercase())
            .bind(name)
            .bind(Role::Candidate.as_str())
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(user_id = %user.id, "registered session user");
        Ok(user)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Candidate>> {
        find_candidate_by_user(&self.pool, user_id).await
    }

    pub async fn upsert_profile(&self, user_id: &str, payload: ProfilePayload) -> Result<Candidate> {
        let sql = format!(
            "INSERT INTO candidates (
                user_id, first_name, last_name, phone, location, bio,
                resume_url, portfolio_url, linkedin_url, skills, experience_level, availability
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (user_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                location = EXCLUDED.location,
                bio = EXCLUDED.bio,
                resume_url = EXCLUDED.resume_url,
                portfolio_url = EXCLUDED.portfolio_url,
                linkedin_url = EXCLUDED.linkedin_url,
                skills = EXCLUDED.skills,
                experience_level = EXCLUDED.experience_level,
                availability = EXCLUDED.availability,
                updated_at = NOW()
             RETURNING {}",
            CANDIDATE_COLUMNS
        );
        let skills: Vec<String> = payload
            .skills
            .into_iter()
            .filter_map(non_empty)
            .collect();
        let candidate = sqlx::query_as::<_, Candidate>(&sql)
            .bind(user_id)
            .bind(payload.first_name.trim())
            .bind(payload.last_name.trim())
            .bind(payload.phone.and_then(non_empty))
            .bind(payload.location.and_then(non_empty))
            .bind(payload.bio.and_then(non_empty))
            .bind(payload.resume_url.and_then(non_empty))
            .bind(payload.portfolio_url.and_then(non_empty))
            .bind(payload.linkedin_url.and_then(non_empty))
            .bind(skills)
            .bind(payload.experience_level.and_then(non_empty))
            .bind(payload.availability.and_then(non_empty))
            .fetch_one(&self.pool)
            .await?;
        Ok(candidate)
    }
}

pub async fn find_user_by_id<'e, E: PgExecutor<'e>>(executor: E, id: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users_sync WHERE id = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn find_user_by_email<'e, E: PgExecutor<'e>>(
    executor: E,
    email: &str,
) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users_sync WHERE email = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

/// Inserts a candidate-role user with a fresh id. A concurrent insert of the same
/// email resolves to the existing row.
pub async fn create_candidate_user<'e, E: PgExecutor<'e>>(
    executor: E,
    email: &str,
    name: &str,
) -> Result<User> {
    let sql = format!(
        "INSERT INTO users_sync (id, email, name, role)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
         RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(email)
        .bind(name)
        .bind(Role::Candidate.as_str())
        .fetch_one(executor)
        .await?;
    Ok(user)
}

pub async fn find_candidate_by_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &str,
) -> Result<Option<Candidate>> {
    let sql = format!("SELECT {} FROM candidates WHERE user_id = $1", CANDIDATE_COLUMNS);
    let candidate = sqlx::query_as::<_, Candidate>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(candidate)
}

pub async fn create_candidate_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &str,
    full_name: &str,
    phone: Option<&str>,
) -> Result<Candidate> {
    let (first_name, last_name) = split_full_name(full_name);
    let sql = format!(
        "INSERT INTO candidates (user_id, first_name, last_name, phone)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
         RETURNING {}",
        CANDIDATE_COLUMNS
    );
    let candidate = sqlx::query_as::<_, Candidate>(&sql)
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .fetch_one(executor)
        .await?;
    Ok(candidate)
}
