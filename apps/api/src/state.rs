use std::sync::Arc;

use axum::extract::FromRef;

use crate::admin::{AdminConsole, AdminSession, AuthProvider};
use crate::applications::{ApplicationIntake, ApplicationRepository};
use crate::jobs::JobRepository;
use crate::listing::{JobListing, JobSource};
use crate::resumes::ResumeTransfer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    /// Resume storage plus the upload constraints enforced at intake.
    pub resumes: ResumeTransfer,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn intake(&self) -> ApplicationIntake {
        ApplicationIntake::new(self.applications.clone(), self.resumes.clone())
    }

    pub fn listing(&self) -> JobListing {
        JobListing::new(JobSource::Repository(self.jobs.clone()))
    }

    pub fn console(&self, session: AdminSession) -> AdminConsole {
        AdminConsole::new(
            session,
            self.jobs.clone(),
            self.applications.clone(),
            self.resumes.clone(),
            self.auth.clone(),
        )
    }
}

impl FromRef<AppState> for Arc<dyn AuthProvider> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
