use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobDraft, JobPosting};

/// CRUD over job postings. Implementations own the active/inactive flag.
///
/// Carried in `AppState` as `Arc<dyn JobRepository>`.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Active postings, newest first.
    async fn list_active(&self) -> Result<Vec<JobPosting>, AppError>;

    /// Every posting regardless of the flag, newest first.
    async fn list_all(&self) -> Result<Vec<JobPosting>, AppError>;

    async fn find(&self, id: Uuid) -> Result<JobPosting, AppError>;

    /// Inserts a new, active posting.
    async fn create(&self, draft: &JobDraft) -> Result<JobPosting, AppError>;

    /// Replaces every content field and stamps `updated_at`. The flag is untouched.
    async fn update(&self, id: Uuid, draft: &JobDraft) -> Result<(), AppError>;

    /// Touches only the flag. Setting the current value again succeeds.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AppError>;

    /// Irreversible. Callers gate this behind an explicit confirmation.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Job {id} not found"))
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn list_active(&self) -> Result<Vec<JobPosting>, AppError> {
        Ok(sqlx::query_as::<_, JobPosting>(
            "SELECT * FROM jobs WHERE is_active = TRUE ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_all(&self) -> Result<Vec<JobPosting>, AppError> {
        Ok(
            sqlx::query_as::<_, JobPosting>("SELECT * FROM jobs ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find(&self, id: Uuid) -> Result<JobPosting, AppError> {
        sqlx::query_as::<_, JobPosting>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, draft: &JobDraft) -> Result<JobPosting, AppError> {
        let job = sqlx::query_as::<_, JobPosting>(
            r#"
            INSERT INTO jobs
                (title, department, location, type, salary, description, requirements, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            RETURNING *
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.department)
        .bind(&draft.location)
        .bind(&draft.employment_type)
        .bind(&draft.salary)
        .bind(&draft.description)
        .bind(&draft.requirements)
        .fetch_one(&self.pool)
        .await?;

        info!("Created job {} ({})", job.id, job.title);
        Ok(job)
    }

    async fn update(&self, id: Uuid, draft: &JobDraft) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = $2, department = $3, location = $4, type = $5,
                salary = $6, description = $7, requirements = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.department)
        .bind(&draft.location)
        .bind(&draft.employment_type)
        .bind(&draft.salary)
        .bind(&draft.description)
        .bind(&draft.requirements)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        info!("Updated job {id}");
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AppError> {
        // Postgres counts matched rows, so re-applying the same value still reports 1.
        let result = sqlx::query("UPDATE jobs SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        info!("Job {id} active = {active}");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        info!("Deleted job {id}");
        Ok(())
    }
}
