use anyhow::{Context, Result};

use crate::resumes::DEFAULT_MAX_RESUME_BYTES;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Base URL of the hosted auth API, e.g. `https://<project>.example.co/auth/v1`.
    pub auth_url: String,
    pub auth_api_key: String,
    pub resume_max_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "resumes".to_string()),
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            auth_url: require_env("AUTH_URL")?,
            auth_api_key: require_env("AUTH_API_KEY")?,
            resume_max_bytes: match std::env::var("RESUME_MAX_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("RESUME_MAX_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_RESUME_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
