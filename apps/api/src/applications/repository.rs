use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::applications::validation::ApplicantDetails;
use crate::errors::AppError;
use crate::models::application::{
    Application, AreaOfInterest, JobApplicationRow, SpontaneousApplicationRow,
};
use crate::resumes::ResumeRef;

/// Create-only writes for candidates, reads for administrators.
/// Applications are immutable once stored.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// `job_id` is stored as given; the posting may already be gone.
    async fn submit_for_job(
        &self,
        job_id: Uuid,
        details: &ApplicantDetails,
        resume: Option<&ResumeRef>,
    ) -> Result<Application, AppError>;

    async fn submit_spontaneous(
        &self,
        details: &ApplicantDetails,
        area: AreaOfInterest,
        resume: Option<&ResumeRef>,
    ) -> Result<Application, AppError>;

    /// Newest first, each joined with the current title of its posting.
    async fn list_job_targeted(&self) -> Result<Vec<Application>, AppError>;

    /// Newest first.
    async fn list_spontaneous(&self) -> Result<Vec<Application>, AppError>;
}

pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn submit_for_job(
        &self,
        job_id: Uuid,
        details: &ApplicantDetails,
        resume: Option<&ResumeRef>,
    ) -> Result<Application, AppError> {
        let row = sqlx::query_as::<_, JobApplicationRow>(
            r#"
            INSERT INTO applications (job_id, name, email, phone, message, resume_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *, (SELECT title FROM jobs WHERE jobs.id = $1) AS job_title
            "#,
        )
        .bind(job_id)
        .bind(&details.name)
        .bind(&details.email)
        .bind(&details.phone)
        .bind(&details.message)
        .bind(resume.map(ResumeRef::as_str))
        .fetch_one(&self.pool)
        .await?;

        info!("Application {} submitted for job {job_id}", row.id);
        Ok(row.into())
    }

    async fn submit_spontaneous(
        &self,
        details: &ApplicantDetails,
        area: AreaOfInterest,
        resume: Option<&ResumeRef>,
    ) -> Result<Application, AppError> {
        let row = sqlx::query_as::<_, SpontaneousApplicationRow>(
            r#"
            INSERT INTO spontaneous_applications (name, email, phone, area, message, resume_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&details.name)
        .bind(&details.email)
        .bind(&details.phone)
        .bind(area.as_str())
        .bind(&details.message)
        .bind(resume.map(ResumeRef::as_str))
        .fetch_one(&self.pool)
        .await?;

        info!("Spontaneous application {} submitted ({area})", row.id);
        Ok(row.into())
    }

    async fn list_job_targeted(&self) -> Result<Vec<Application>, AppError> {
        let rows = sqlx::query_as::<_, JobApplicationRow>(
            r#"
            SELECT a.*, j.title AS job_title
            FROM applications a
            LEFT JOIN jobs j ON j.id = a.job_id
            ORDER BY a.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Application::from).collect())
    }

    async fn list_spontaneous(&self) -> Result<Vec<Application>, AppError> {
        let rows = sqlx::query_as::<_, SpontaneousApplicationRow>(
            "SELECT * FROM spontaneous_applications ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Application::from).collect())
    }
}
