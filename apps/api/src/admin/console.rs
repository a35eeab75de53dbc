//! Admin Console orchestration over the job and application repositories.
//!
//! One console per admin session. It owns a single job editor (only one form
//! may be open at a time) and the last fetched job list, which is replaced by a
//! full re-fetch after every successful mutation and left untouched on failure.

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::admin::session::{AdminSession, AuthProvider};
use crate::applications::ApplicationRepository;
use crate::errors::{AppError, FieldError};
use crate::jobs::JobRepository;
use crate::models::application::Application;
use crate::models::job::{JobFields, JobPosting};
use crate::resumes::{ResumeDownload, ResumeTransfer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Idle,
    /// `errors` holds the field errors of the last rejected submit.
    FormOpen {
        mode: FormMode,
        errors: Vec<FieldError>,
    },
    Submitting {
        mode: FormMode,
    },
}

/// Explicit gate for irreversible actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    NotConfirmed,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::NotConfirmed
        }
    }
}

/// Admin listing row: the application plus what the table shows for it.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationEntry {
    #[serde(flatten)]
    pub application: Application,
    /// Job title, the missing-job placeholder, or the area label.
    pub position: String,
    /// Present only when a resume was uploaded.
    pub resume_download: Option<String>,
}

/// Characters left bare in a path segment or query value; everything else is escaped.
const LINK_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// `/api/v1/admin/resumes/<key>?name=<candidate>`, the download route with the
/// candidate name that shapes the suggested filename.
pub fn resume_download_link(key: &str, candidate_name: &str) -> String {
    format!(
        "/api/v1/admin/resumes/{}?name={}",
        utf8_percent_encode(key, LINK_ESCAPES),
        utf8_percent_encode(candidate_name.trim(), LINK_ESCAPES)
    )
}

impl From<Application> for ApplicationEntry {
    fn from(application: Application) -> Self {
        let resume_download = application
            .resume_url
            .as_deref()
            .map(|key| resume_download_link(key, &application.name));
        ApplicationEntry {
            position: application.position_label().to_string(),
            resume_download,
            application,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCounts {
    pub jobs: usize,
    pub applications: usize,
    pub spontaneous: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub counts: DashboardCounts,
    pub jobs: Vec<JobPosting>,
    pub applications: Vec<ApplicationEntry>,
    pub spontaneous: Vec<ApplicationEntry>,
}

pub struct AdminConsole {
    session: AdminSession,
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    resumes: ResumeTransfer,
    auth: Arc<dyn AuthProvider>,
    editor: EditorState,
    job_list: Vec<JobPosting>,
}

impl AdminConsole {
    pub fn new(
        session: AdminSession,
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        resumes: ResumeTransfer,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            session,
            jobs,
            applications,
            resumes,
            auth,
            editor: EditorState::Idle,
            job_list: Vec::new(),
        }
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// The job list as of the last successful fetch.
    pub fn job_list(&self) -> &[JobPosting] {
        &self.job_list
    }

    pub async fn refresh_jobs(&mut self) -> Result<&[JobPosting], AppError> {
        self.job_list = self.jobs.list_all().await?;
        Ok(&self.job_list)
    }

    pub async fn dashboard(&mut self) -> Result<Dashboard, AppError> {
        self.refresh_jobs().await?;
        let applications = self.job_applications().await?;
        let spontaneous = self.spontaneous_applications().await?;
        Ok(Dashboard {
            counts: DashboardCounts {
                jobs: self.job_list.len(),
                applications: applications.len(),
                spontaneous: spontaneous.len(),
            },
            jobs: self.job_list.clone(),
            applications,
            spontaneous,
        })
    }

    pub async fn job_applications(&self) -> Result<Vec<ApplicationEntry>, AppError> {
        let rows = self.applications.list_job_targeted().await?;
        Ok(rows.into_iter().map(ApplicationEntry::from).collect())
    }

    pub async fn spontaneous_applications(&self) -> Result<Vec<ApplicationEntry>, AppError> {
        let rows = self.applications.list_spontaneous().await?;
        Ok(rows.into_iter().map(ApplicationEntry::from).collect())
    }

    fn ensure_idle(&self) -> Result<(), AppError> {
        match &self.editor {
            EditorState::Idle => Ok(()),
            _ => Err(AppError::InvalidState(
                "another job form is already open".to_string(),
            )),
        }
    }

    pub fn open_create_form(&mut self) -> Result<JobFields, AppError> {
        self.ensure_idle()?;
        self.editor = EditorState::FormOpen {
            mode: FormMode::Create,
            errors: Vec::new(),
        };
        Ok(JobFields::default())
    }

    /// Opens the editor pre-filled from the current stored posting.
    pub async fn open_edit_form(&mut self, id: Uuid) -> Result<JobFields, AppError> {
        self.ensure_idle()?;
        let job = self.jobs.find(id).await?;
        self.editor = EditorState::FormOpen {
            mode: FormMode::Edit(id),
            errors: Vec::new(),
        };
        Ok(JobFields::from_posting(&job))
    }

    pub fn close_form(&mut self) {
        self.editor = EditorState::Idle;
    }

    /// Submits the open form. On success the editor closes and the fresh job
    /// list is returned; on failure the form stays open.
    pub async fn submit_form(&mut self, fields: &JobFields) -> Result<&[JobPosting], AppError> {
        let mode = match &self.editor {
            EditorState::FormOpen { mode, .. } => *mode,
            _ => {
                return Err(AppError::InvalidState(
                    "no job form is open".to_string(),
                ))
            }
        };

        let draft = match fields.validate() {
            Ok(draft) => draft,
            Err(e) => {
                self.editor = EditorState::FormOpen {
                    mode,
                    errors: e.field_errors().to_vec(),
                };
                return Err(e);
            }
        };

        self.editor = EditorState::Submitting { mode };
        let outcome = match mode {
            FormMode::Create => self.jobs.create(&draft).await.map(|_| ()),
            FormMode::Edit(id) => self.jobs.update(id, &draft).await,
        };

        if let Err(e) = outcome {
            self.editor = EditorState::FormOpen {
                mode,
                errors: Vec::new(),
            };
            return Err(e);
        }

        info!("Admin {} saved job form ({mode:?})", self.session.user.id);
        self.editor = EditorState::Idle;
        self.refresh_jobs().await
    }

    pub async fn set_job_active(&mut self, id: Uuid, active: bool) -> Result<&[JobPosting], AppError> {
        self.jobs.set_active(id, active).await?;
        self.refresh_jobs().await
    }

    /// Flips the flag relative to the last fetched list.
    pub async fn toggle_job(&mut self, id: Uuid) -> Result<&[JobPosting], AppError> {
        let current = match self.job_list.iter().find(|j| j.id == id) {
            Some(job) => job.is_active,
            None => self.jobs.find(id).await?.is_active,
        };
        self.set_job_active(id, !current).await
    }

    pub async fn delete_job(
        &mut self,
        id: Uuid,
        confirmation: Confirmation,
    ) -> Result<&[JobPosting], AppError> {
        if confirmation != Confirmation::Confirmed {
            return Err(AppError::ConfirmationRequired(format!(
                "deleting job {id} is irreversible and must be confirmed"
            )));
        }
        self.jobs.delete(id).await?;
        info!("Admin {} deleted job {id}", self.session.user.id);
        self.refresh_jobs().await
    }

    pub async fn download_resume(
        &self,
        key: &str,
        candidate_name: &str,
    ) -> Result<ResumeDownload, AppError> {
        self.resumes.download(key, candidate_name).await
    }

    /// Ends the session with the auth service. The caller routes back to login.
    pub async fn sign_out(self) -> Result<(), AppError> {
        self.auth.sign_out(&self.session.access_token).await?;
        info!("Admin {} signed out", self.session.user.id);
        Ok(())
    }
}
