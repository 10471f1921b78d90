use crate::dto::application_dto::{AdminApplicationsQuery, ApplicationForm};
use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationDetail, ApplicationStatus, CandidateApplication, APPLICATION_COLUMNS,
};
use crate::models::job::Job;
use crate::models::notification::{NewNotification, NotificationType};
use crate::services::candidate_service::{
    create_candidate_for_user, create_candidate_user, find_candidate_by_user, find_user_by_email,
};
use crate::services::job_service::find_job;
use crate::services::notification_service::NotificationService;
use sqlx::{PgPool, Postgres, QueryBuilder};

pub const ALREADY_APPLIED: &str = "already_applied";

const DETAIL_SELECT: &str = "SELECT a.id, a.job_id, a.candidate_id, a.cover_letter, a.cv_url, a.status, a.applied_at, a.updated_at,
        j.title AS job_title, j.company AS job_company,
        c.first_name AS candidate_first_name, c.last_name AS candidate_last_name, c.phone AS candidate_phone,
        u.id AS user_id, u.email AS user_email
     FROM applications a
     JOIN jobs j ON j.id = a.job_id
     JOIN candidates c ON c.id = a.candidate_id
     JOIN users_sync u ON u.id = c.user_id";

#[derive(Debug, Clone)]
pub struct SubmittedApplication {
    pub application: Application,
    pub job: Job,
    pub candidate_user_id: String,
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    notifications: NotificationService,
}

impl ApplicationService {
    pub fn new(pool: PgPool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Records a candidate's application to a job.
    ///
    /// User, candidate profile and application rows are written in one transaction;
    /// the unique key on (job, candidate) turns a concurrent double submission into
    /// the same duplicate error as the explicit check. Notifications are sent after
    /// commit and never fail the submission.
    pub async fn submit(
        &self,
        form: &ApplicationForm,
        cv_url: Option<&str>,
    ) -> Result<SubmittedApplication> {
        let mut tx = self.pool.begin().await?;

        let user = match find_user_by_email(&mut *tx, &form.email).await? {
            Some(user) => user,
            None => {
                let user = create_candidate_user(&mut *tx, &form.email, &form.name).await?;
                tracing::info!(user_id = %user.id, "created user for applicant");
                user
            }
        };

        let candidate = match find_candidate_by_user(&mut *tx, &user.id).await? {
            Some(candidate) => candidate,
            None => {
                create_candidate_for_user(&mut *tx, &user.id, &form.name, form.phone.as_deref())
                    .await?
            }
        };

        let already_applied = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE job_id = $1 AND candidate_id = $2)",
        )
        .bind(form.job_id)
        .bind(candidate.id)
        .fetch_one(&mut *tx)
        .await?;
        if already_applied {
            return Err(Error::Duplicate(ALREADY_APPLIED.into()));
        }

        let job = find_job(&mut *tx, form.job_id)
            .await?
            .ok_or_else(|| Error::NotFound("job_not_found".into()))?;

        let sql = format!(
            "INSERT INTO applications (job_id, candidate_id, cover_letter, cv_url, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(job.id)
            .bind(candidate.id)
            .bind(form.cover_letter.as_deref())
            .bind(cv_url)
            .bind(ApplicationStatus::Pending.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    Error::Duplicate(ALREADY_APPLIED.into())
                }
                other => Error::from(other),
            })?;

        tx.commit().await?;
        tracing::info!(
            application_id = application.id,
            job_id = job.id,
            candidate_id = candidate.id,
            "application submitted"
        );

        for notification in submission_notifications(&application, &job, &user.id) {
            self.notifications.create_best_effort(&notification).await;
        }

        Ok(SubmittedApplication {
            application,
            job,
            candidate_user_id: user.id,
        })
    }

    pub async fn list_for_candidate_user(&self, user_id: &str) -> Result<Vec<CandidateApplication>> {
        let items = sqlx::query_as::<_, CandidateApplication>(
            "SELECT a.id, a.job_id, a.status, a.cover_letter, a.cv_url, a.applied_at, a.updated_at,
                j.title AS job_title, j.company AS job_company,
                j.location AS job_location, j.contract_type AS job_contract_type
             FROM applications a
             JOIN candidates c ON c.id = a.candidate_id
             JOIN jobs j ON j.id = a.job_id
             WHERE c.user_id = $1
             ORDER BY a.applied_at DESC, a.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_all(&self, query: &AdminApplicationsQuery) -> Result<Vec<ApplicationDetail>> {
        let mut builder = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        builder.push(" WHERE TRUE");
        if let Some(status) = &query.status {
            builder.push(" AND a.status = ").push_bind(status.clone());
        }
        if let Some(job_id) = query.job_id {
            builder.push(" AND a.job_id = ").push_bind(job_id);
        }
        builder.push(" ORDER BY a.applied_at DESC, a.id DESC");

        let items = builder
            .build_query_as::<ApplicationDetail>()
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get_detail(&self, id: i64) -> Result<ApplicationDetail> {
        let sql = format!("{} WHERE a.id = $1", DETAIL_SELECT);
        sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("application_not_found".into()))
    }

    /// Writes a new status and notifies the candidate when the status has a message.
    /// Returns the notification that was created, if any.
    pub async fn update_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<NewNotification>> {
        let detail = self.get_detail(id).await?;

        sqlx::query("UPDATE applications SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(
            application_id = id,
            from = %detail.status,
            to = status.as_str(),
            "application status changed"
        );

        let Some(notification) = status_notification(status, &detail) else {
            return Ok(None);
        };
        self.notifications.create_best_effort(&notification).await;
        Ok(Some(notification))
    }
}

/// Confirmation for the applicant, plus an alert for the job owner when the job has one.
pub fn submission_notifications(
    application: &Application,
    job: &Job,
    candidate_user_id: &str,
) -> Vec<NewNotification> {
    let mut out = vec![NewNotification {
        user_id: candidate_user_id.to_string(),
        notification_type: NotificationType::ApplicationStatus,
        title: "Application submitted".into(),
        message: format!(
            "Your application for \"{}\" at {} has been received.",
            job.title, job.company
        ),
        job_id: Some(job.id),
        application_id: Some(application.id),
    }];

    if let Some(owner) = job.user_id.as_deref() {
        out.push(NewNotification {
            user_id: owner.to_string(),
            notification_type: NotificationType::NewApplication,
            title: "New application".into(),
            message: format!("A new candidate applied to \"{}\".", job.title),
            job_id: Some(job.id),
            application_id: Some(application.id),
        });
    }
    out
}

pub fn status_notification(
    status: ApplicationStatus,
    detail: &ApplicationDetail,
) -> Option<NewNotification> {
    let (title, message) = match status {
        ApplicationStatus::Reviewed => (
            "Application in review",
            format!(
                "Your application for \"{}\" at {} is being reviewed.",
                detail.job_title, detail.job_company
            ),
        ),
        ApplicationStatus::Accepted => (
            "Congratulations!",
            format!(
                "Your application for \"{}\" at {} has been accepted. The recruiter will contact you shortly.",
                detail.job_title, detail.job_company
            ),
        ),
        ApplicationStatus::Rejected => (
            "Application update",
            format!(
                "Unfortunately your application for \"{}\" at {} was not retained.",
                detail.job_title, detail.job_company
            ),
        ),
        _ => return None,
    };

    Some(NewNotification {
        user_id: detail.user_id.clone(),
        notification_type: NotificationType::ApplicationStatus,
        title: title.to_string(),
        message,
        job_id: Some(detail.job_id),
        application_id: Some(detail.id),
    })
}
