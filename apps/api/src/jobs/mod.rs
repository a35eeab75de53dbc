// Job postings: repository contract and its Postgres implementation.
// Validation of admin input lives on `models::job::JobFields`.

pub mod repository;

pub use repository::{JobRepository, PgJobRepository};
