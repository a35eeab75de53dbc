//! Public Listing View: active postings for the careers page.
//!
//! A backend failure never becomes an error response here. The view degrades
//! to an "unavailable" empty state and the page still offers the spontaneous
//! application form.

pub mod handlers;
#[cfg(test)]
pub mod seed;

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::JobRepository;
use crate::models::job::JobPosting;

pub const NO_OPENINGS_MESSAGE: &str =
    "There are no open positions right now. You can still send a spontaneous application.";
pub const UNAVAILABLE_MESSAGE: &str =
    "Open positions could not be loaded. You can still send a spontaneous application.";

/// Public projection of a posting: no flag, no timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobCard {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
}

impl From<JobPosting> for JobCard {
    fn from(job: JobPosting) -> Self {
        JobCard {
            id: job.id,
            title: job.title,
            department: job.department,
            location: job.location,
            employment_type: job.employment_type,
            salary: job.salary,
            description: job.description,
            requirements: job.requirements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ListingView {
    Jobs { jobs: Vec<JobCard> },
    Empty { message: &'static str },
    Unavailable { message: &'static str },
}

pub enum JobSource {
    Repository(Arc<dyn JobRepository>),
    #[cfg(test)]
    Seed(Vec<JobPosting>),
}

pub struct JobListing {
    source: JobSource,
}

impl JobListing {
    pub fn new(source: JobSource) -> Self {
        Self { source }
    }

    async fn fetch(&self) -> Result<Vec<JobPosting>, AppError> {
        match &self.source {
            JobSource::Repository(jobs) => jobs.list_active().await,
            #[cfg(test)]
            JobSource::Seed(postings) => {
                let mut active: Vec<_> = postings.iter().filter(|j| j.is_active).cloned().collect();
                active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(active)
            }
        }
    }

    pub async fn load(&self) -> ListingView {
        match self.fetch().await {
            Ok(jobs) if jobs.is_empty() => ListingView::Empty {
                message: NO_OPENINGS_MESSAGE,
            },
            Ok(jobs) => ListingView::Jobs {
                jobs: jobs.into_iter().map(JobCard::from).collect(),
            },
            Err(e) => {
                warn!("Job listing degraded to empty state: {e}");
                ListingView::Unavailable {
                    message: UNAVAILABLE_MESSAGE,
                }
            }
        }
    }

    /// A single posting, only while it is active.
    pub async fn open_posting(&self, id: Uuid) -> Result<JobCard, AppError> {
        let posting = match &self.source {
            JobSource::Repository(jobs) => jobs.find(id).await?,
            #[cfg(test)]
            JobSource::Seed(postings) => postings
                .iter()
                .find(|j| j.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?,
        };
        if !posting.is_active {
            return Err(AppError::NotFound(format!("Job {id} is not open")));
        }
        Ok(JobCard::from(posting))
    }
}
