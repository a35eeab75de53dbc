use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::errors::{AppError, FieldError};
use crate::models::application::AreaOfInterest;

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_PHONE_DIGITS: usize = 10;

/// Raw candidate input shared by both application kinds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicantFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Candidate details that passed every rule. `message` is `None` when left blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && email_pattern().is_match(email)
}

/// Formatting characters such as `(11) 99999-9999` are allowed and not counted.
pub fn phone_digit_count(phone: &str) -> usize {
    phone.chars().filter(char::is_ascii_digit).count()
}

impl ApplicantFields {
    /// Collects failures into `errors`; returns details only when this block is clean.
    fn check(&self, errors: &mut Vec<FieldError>) -> Option<ApplicantDetails> {
        let before = errors.len();
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();

        if name.chars().count() < MIN_NAME_CHARS {
            errors.push(FieldError::new(
                "name",
                format!("name must be at least {MIN_NAME_CHARS} characters"),
            ));
        }
        if email.is_empty() {
            errors.push(FieldError::new("email", "email is required"));
        } else if !is_valid_email(email) {
            errors.push(FieldError::new("email", "invalid email address"));
        }
        if phone_digit_count(phone) < MIN_PHONE_DIGITS {
            errors.push(FieldError::new(
                "phone",
                format!("phone must have at least {MIN_PHONE_DIGITS} digits"),
            ));
        }

        if errors.len() > before {
            return None;
        }
        Some(ApplicantDetails {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            message: self
                .message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        })
    }

    pub fn validate(&self) -> Result<ApplicantDetails, AppError> {
        let mut errors = Vec::new();
        match self.check(&mut errors) {
            Some(details) => Ok(details),
            None => Err(AppError::Validation(errors)),
        }
    }

    /// Spontaneous variant: the applicant rules plus a required area from the closed set.
    pub fn validate_with_area(
        &self,
        area: &str,
    ) -> Result<(ApplicantDetails, AreaOfInterest), AppError> {
        let mut errors = Vec::new();
        let details = self.check(&mut errors);
        let area = if area.trim().is_empty() {
            errors.push(FieldError::new("area", "area of interest is required"));
            None
        } else {
            match area.parse::<AreaOfInterest>() {
                Ok(area) => Some(area),
                Err(e) => {
                    errors.push(FieldError::new("area", e.to_string()));
                    None
                }
            }
        };

        match (details, area) {
            (Some(details), Some(area)) if errors.is_empty() => Ok((details, area)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}
