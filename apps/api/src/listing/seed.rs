use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::job::{split_requirements, JobPosting};

fn posting(
    title: &str,
    department: &str,
    requirements: &str,
    is_active: bool,
    age_days: i64,
) -> JobPosting {
    JobPosting {
        id: Uuid::new_v4(),
        title: title.to_string(),
        department: department.to_string(),
        location: "São Paulo, SP".to_string(),
        employment_type: "full-time".to_string(),
        salary: "R$ 8.000 - R$ 12.000".to_string(),
        description: format!("{title} for the {department} team."),
        requirements: split_requirements(requirements),
        is_active,
        created_at: Utc::now() - Duration::days(age_days),
        updated_at: None,
    }
}

/// Static postings that stand in for the repository in listing tests.
pub fn postings() -> Vec<JobPosting> {
    vec![
        posting(
            "Senior Frontend Developer",
            "Technology",
            "React, TypeScript, 5+ years",
            true,
            10,
        ),
        posting("Account Executive", "Sales", "B2B sales, CRM", true, 2),
        posting("Payroll Analyst", "Finance", "Payroll, Excel", false, 5),
    ]
}
