use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::{AppError, FieldError};

/// A single job opening as stored in the `jobs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub location: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub employment_type: String,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Raw admin form input. `requirements` is the comma-separated text box.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFields {
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub salary: String,
    pub description: String,
    pub requirements: String,
}

/// Validated posting content, ready for insert or full replace.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub title: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
}

impl JobFields {
    /// Pre-fills the form from an existing posting, joining tags back with ", ".
    pub fn from_posting(job: &JobPosting) -> Self {
        JobFields {
            title: job.title.clone(),
            department: job.department.clone(),
            location: job.location.clone(),
            employment_type: job.employment_type.clone(),
            salary: job.salary.clone(),
            description: job.description.clone(),
            requirements: job.requirements.join(", "),
        }
    }

    /// Checks every field and returns all failures at once.
    pub fn validate(&self) -> Result<JobDraft, AppError> {
        let mut errors = Vec::new();
        let required = [
            ("title", &self.title),
            ("department", &self.department),
            ("location", &self.location),
            ("type", &self.employment_type),
            ("salary", &self.salary),
            ("description", &self.description),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, format!("{field} is required")));
            }
        }

        let requirements = split_requirements(&self.requirements);
        if requirements.is_empty() {
            errors.push(FieldError::new(
                "requirements",
                "at least one requirement is required",
            ));
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(JobDraft {
            title: self.title.trim().to_string(),
            department: self.department.trim().to_string(),
            location: self.location.trim().to_string(),
            employment_type: self.employment_type.trim().to_string(),
            salary: self.salary.trim().to_string(),
            description: self.description.trim().to_string(),
            requirements,
        })
    }
}

/// Splits the comma-separated requirements box into trimmed tags.
/// Empty tags from doubled or trailing commas are dropped.
pub fn split_requirements(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
