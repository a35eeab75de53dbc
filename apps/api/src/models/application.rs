use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Shown in place of a job title when the referenced posting no longer exists.
pub const MISSING_JOB_PLACEHOLDER: &str = "Job no longer available";

/// Closed set of departments a spontaneous applicant can pick.
/// Keep in sync with `GET /api/v1/areas`, which front ends use for the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaOfInterest {
    Technology,
    Sales,
    Marketing,
    Finance,
    HumanResources,
    Operations,
    Administrative,
    Legal,
    Other,
}

impl AreaOfInterest {
    pub const ALL: [AreaOfInterest; 9] = [
        AreaOfInterest::Technology,
        AreaOfInterest::Sales,
        AreaOfInterest::Marketing,
        AreaOfInterest::Finance,
        AreaOfInterest::HumanResources,
        AreaOfInterest::Operations,
        AreaOfInterest::Administrative,
        AreaOfInterest::Legal,
        AreaOfInterest::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AreaOfInterest::Technology => "technology",
            AreaOfInterest::Sales => "sales",
            AreaOfInterest::Marketing => "marketing",
            AreaOfInterest::Finance => "finance",
            AreaOfInterest::HumanResources => "human-resources",
            AreaOfInterest::Operations => "operations",
            AreaOfInterest::Administrative => "administrative",
            AreaOfInterest::Legal => "legal",
            AreaOfInterest::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AreaOfInterest::Technology => "Technology",
            AreaOfInterest::Sales => "Sales",
            AreaOfInterest::Marketing => "Marketing",
            AreaOfInterest::Finance => "Finance",
            AreaOfInterest::HumanResources => "Human Resources",
            AreaOfInterest::Operations => "Operations",
            AreaOfInterest::Administrative => "Administrative",
            AreaOfInterest::Legal => "Legal",
            AreaOfInterest::Other => "Other",
        }
    }
}

impl fmt::Display for AreaOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown area of interest '{0}'")]
pub struct UnknownArea(pub String);

impl FromStr for AreaOfInterest {
    type Err = UnknownArea;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AreaOfInterest::ALL
            .into_iter()
            .find(|area| area.as_str() == wanted)
            .ok_or_else(|| UnknownArea(s.to_string()))
    }
}

/// Discriminates the two application variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ApplicationKind {
    /// `job_title` is the current title of the referenced posting, `None` once it is deleted.
    JobTargeted {
        job_id: Uuid,
        job_title: Option<String>,
    },
    Spontaneous {
        area: AreaOfInterest,
    },
}

/// A submitted application. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: ApplicationKind,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Label for the "position" column of the admin listing.
    pub fn position_label(&self) -> &str {
        match &self.kind {
            ApplicationKind::JobTargeted { job_title, .. } => {
                job_title.as_deref().unwrap_or(MISSING_JOB_PLACEHOLDER)
            }
            ApplicationKind::Spontaneous { area } => area.label(),
        }
    }
}

/// Row of the `applications` table, left-joined with the current job title.
#[derive(Debug, Clone, FromRow)]
pub struct JobApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub job_title: Option<String>,
}

impl From<JobApplicationRow> for Application {
    fn from(row: JobApplicationRow) -> Self {
        Application {
            id: row.id,
            kind: ApplicationKind::JobTargeted {
                job_id: row.job_id,
                job_title: row.job_title,
            },
            name: row.name,
            email: row.email,
            phone: row.phone,
            message: row.message,
            resume_url: row.resume_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SpontaneousApplicationRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub area: String,
    pub message: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SpontaneousApplicationRow> for Application {
    fn from(row: SpontaneousApplicationRow) -> Self {
        // Rows written before the area set was fixed may hold other values.
        let area = row.area.parse().unwrap_or_else(|e: UnknownArea| {
            warn!("Application {}: {e}, listing as 'other'", row.id);
            AreaOfInterest::Other
        });
        Application {
            id: row.id,
            kind: ApplicationKind::Spontaneous { area },
            name: row.name,
            email: row.email,
            phone: row.phone,
            message: row.message,
            resume_url: row.resume_url,
            created_at: row.created_at,
        }
    }
}
