// Application Intake: validation rules, the validate → upload → insert flow,
// and the create-only application repository.

pub mod handlers;
pub mod intake;
pub mod repository;
pub mod validation;

pub use intake::{ApplicationForm, ApplicationIntake, ApplicationTarget};
pub use repository::{ApplicationRepository, PgApplicationRepository};
pub use validation::ApplicantFields;
