use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::repository::ApplicationRepository;
use crate::applications::validation::ApplicantFields;
use crate::errors::AppError;
use crate::models::application::Application;
use crate::resumes::{ResumeTransfer, ResumeUpload};

/// Which kind of application a form produces.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationTarget {
    Job(Uuid),
    /// Raw picker value, checked against the closed area set.
    Spontaneous { area: String },
}

/// One submission of the application form, in either mode. The resume is optional for both.
#[derive(Debug, Clone)]
pub struct ApplicationForm {
    pub target: ApplicationTarget,
    pub fields: ApplicantFields,
    pub resume: Option<ResumeUpload>,
}

/// Validate → upload resume → insert row.
#[derive(Clone)]
pub struct ApplicationIntake {
    applications: Arc<dyn ApplicationRepository>,
    resumes: ResumeTransfer,
}

impl ApplicationIntake {
    pub fn new(applications: Arc<dyn ApplicationRepository>, resumes: ResumeTransfer) -> Self {
        Self {
            applications,
            resumes,
        }
    }

    /// Every rule, resume constraints included, is checked before any store call.
    /// A failed upload aborts the submission, so no row points at a missing file.
    pub async fn submit(&self, form: ApplicationForm) -> Result<Application, AppError> {
        let mut errors = Vec::new();

        let validated = match &form.target {
            ApplicationTarget::Job(_) => form.fields.validate().map(|d| (d, None)),
            ApplicationTarget::Spontaneous { area } => form
                .fields
                .validate_with_area(area)
                .map(|(d, area)| (d, Some(area))),
        };
        let validated = match validated {
            Ok(v) => Some(v),
            Err(AppError::Validation(fields)) => {
                errors.extend(fields);
                None
            }
            Err(other) => return Err(other),
        };

        if let Some(upload) = &form.resume {
            match self.resumes.constraints().check(upload) {
                Ok(_) => {}
                Err(AppError::Validation(fields)) => errors.extend(fields),
                Err(other) => return Err(other),
            }
        }

        let (details, area) = match validated {
            Some(v) if errors.is_empty() => v,
            _ => return Err(AppError::Validation(errors)),
        };

        let resume = match form.resume {
            Some(upload) => Some(self.resumes.upload(upload).await?),
            None => None,
        };

        let inserted = match (&form.target, area) {
            (ApplicationTarget::Job(job_id), _) => {
                self.applications
                    .submit_for_job(*job_id, &details, resume.as_ref())
                    .await
            }
            (ApplicationTarget::Spontaneous { .. }, Some(area)) => {
                self.applications
                    .submit_spontaneous(&details, area, resume.as_ref())
                    .await
            }
            (ApplicationTarget::Spontaneous { .. }, None) => {
                return Err(AppError::invalid("area", "area of interest is required"))
            }
        };

        match inserted {
            Ok(application) => {
                info!(
                    "Application {} accepted (resume: {})",
                    application.id,
                    application.resume_url.as_deref().unwrap_or("none")
                );
                Ok(application)
            }
            Err(e) => {
                if let Some(key) = &resume {
                    warn!("Application insert failed, resume {} is orphaned", key.as_str());
                }
                Err(e)
            }
        }
    }
}
