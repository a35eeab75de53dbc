//! Admin session context. Token issuance and verification belong to the hosted
//! auth service; this module only carries the verified session and tears it down.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired access token")]
    InvalidToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => AppError::Unauthorized,
            other => AppError::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// The hosted auth service, as far as the admin console needs it.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn verify(&self, access_token: &str) -> Result<AdminUser, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// REST client for a GoTrue-style auth API (`GET /user`, `POST /logout`).
#[derive(Clone)]
pub struct HostedAuth {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HostedAuth {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{path}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    match response.status() {
        s if s.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidToken),
        s => {
            let message = response.text().await.unwrap_or_default();
            warn!("Auth API returned {s}: {message}");
            Err(AuthError::Api {
                status: s.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl AuthProvider for HostedAuth {
    async fn verify(&self, access_token: &str) -> Result<AdminUser, AuthError> {
        let response = self
            .request(reqwest::Method::GET, "user", access_token)
            .send()
            .await?;
        let user: AdminUser = check_status(response).await?.json().await?;
        debug!("Verified admin session for {}", user.id);
        Ok(user)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .request(reqwest::Method::POST, "logout", access_token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// A verified admin session. Extracting it from a request requires
/// `Authorization: Bearer <token>` accepted by the auth provider.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub access_token: String,
    pub user: AdminUser,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    Arc<dyn AuthProvider>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?.to_string();
        let auth = <Arc<dyn AuthProvider> as FromRef<S>>::from_ref(state);
        let user = auth.verify(&token).await?;
        Ok(AdminSession {
            access_token: token,
            user,
        })
    }
}
