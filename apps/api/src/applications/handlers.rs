use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::applications::intake::{ApplicationForm, ApplicationTarget};
use crate::applications::validation::ApplicantFields;
use crate::errors::AppError;
use crate::models::application::{Application, AreaOfInterest};
use crate::resumes::ResumeUpload;
use crate::state::AppState;

/// Multipart field carrying the resume file.
const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub id: Uuid,
    pub resume_attached: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Application> for SubmissionReceipt {
    fn from(app: Application) -> Self {
        SubmissionReceipt {
            id: app.id,
            resume_attached: app.resume_url.is_some(),
            created_at: app.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AreaOption {
    pub value: &'static str,
    pub label: &'static str,
}

struct MultipartForm {
    text: HashMap<String, String>,
    resume: Option<ResumeUpload>,
}

impl MultipartForm {
    fn take(&mut self, name: &str) -> String {
        self.text.remove(name).unwrap_or_default()
    }

    fn applicant(&mut self) -> ApplicantFields {
        ApplicantFields {
            name: self.take("name"),
            email: self.take("email"),
            phone: self.take("phone"),
            message: self.text.remove("message"),
        }
    }
}

fn malformed(e: impl std::fmt::Display) -> AppError {
    AppError::invalid("form", format!("malformed multipart body: {e}"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm {
        text: HashMap::new(),
        resume: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == RESUME_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(malformed)?;
            // Browsers send an empty part when no file was picked.
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            form.resume = Some(ResumeUpload {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(malformed)?;
            form.text.insert(name, value);
        }
    }

    Ok(form)
}

/// POST /api/v1/jobs/:id/applications
pub async fn handle_apply_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    let mut form = read_multipart(multipart).await?;
    let application = state
        .intake()
        .submit(ApplicationForm {
            target: ApplicationTarget::Job(job_id),
            fields: form.applicant(),
            resume: form.resume.take(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(application.into())))
}

/// POST /api/v1/applications/spontaneous
pub async fn handle_apply_spontaneous(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    let mut form = read_multipart(multipart).await?;
    let area = form.take("area");
    let application = state
        .intake()
        .submit(ApplicationForm {
            target: ApplicationTarget::Spontaneous { area },
            fields: form.applicant(),
            resume: form.resume.take(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(application.into())))
}

/// GET /api/v1/areas
pub async fn handle_list_areas() -> Json<Vec<AreaOption>> {
    Json(
        AreaOfInterest::ALL
            .iter()
            .map(|area| AreaOption {
                value: area.as_str(),
                label: area.label(),
            })
            .collect(),
    )
}
