//! Resume Transfer: candidate uploads at submission time, admin downloads on demand.
//!
//! Type and size checks run on the in-memory upload before the object store is
//! touched, so an invalid file never costs a network round trip.

pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

pub use s3::S3ObjectStore;

/// 5 MiB, the limit advertised on the application forms.
pub const DEFAULT_MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeFormat {
    Pdf,
    Doc,
    Docx,
}

impl ResumeFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "application/pdf",
            ResumeFormat::Doc => "application/msword",
            ResumeFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Doc => "doc",
            ResumeFormat::Docx => "docx",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        [ResumeFormat::Pdf, ResumeFormat::Doc, ResumeFormat::Docx]
            .into_iter()
            .find(|f| f.mime().eq_ignore_ascii_case(essence))
    }

    fn from_extension(ext: &str) -> Option<Self> {
        [ResumeFormat::Pdf, ResumeFormat::Doc, ResumeFormat::Docx]
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }
}

/// A candidate-supplied file, held in memory until it passes the constraints.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ResumeUpload {
    /// Lower-cased extension of the original filename, if it has one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Declared content type first; browsers that send a generic type fall back to the extension.
    fn format(&self) -> Option<ResumeFormat> {
        let declared = self
            .content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty() && !ct.starts_with(GENERIC_CONTENT_TYPE));
        match declared {
            Some(ct) => ResumeFormat::from_mime(ct),
            None => self
                .extension()
                .and_then(|ext| ResumeFormat::from_extension(&ext)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResumeConstraints {
    pub allowed: Vec<ResumeFormat>,
    pub max_bytes: usize,
}

impl Default for ResumeConstraints {
    fn default() -> Self {
        Self {
            allowed: vec![ResumeFormat::Pdf, ResumeFormat::Doc, ResumeFormat::Docx],
            max_bytes: DEFAULT_MAX_RESUME_BYTES,
        }
    }
}

impl ResumeConstraints {
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    /// Returns the detected format, or a `resume` field error.
    pub fn check(&self, upload: &ResumeUpload) -> Result<ResumeFormat, AppError> {
        if upload.bytes.is_empty() {
            return Err(AppError::invalid("resume", "resume file is empty"));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(AppError::invalid(
                "resume",
                format!(
                    "resume exceeds the {} MB limit",
                    self.max_bytes as f64 / (1024.0 * 1024.0)
                ),
            ));
        }
        match upload.format() {
            Some(format) if self.allowed.contains(&format) => Ok(format),
            _ => {
                let names: Vec<_> = self
                    .allowed
                    .iter()
                    .map(|f| f.extension().to_ascii_uppercase())
                    .collect();
                Err(AppError::invalid(
                    "resume",
                    format!("only {} files are accepted", names.join(", ")),
                ))
            }
        }
    }
}

/// Opaque key of a stored resume inside the `resumes` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResumeRef(String);

impl ResumeRef {
    /// `{unix-millis}-{random}.{ext}`.
    pub fn generate(extension: &str) -> Self {
        let random = Uuid::new_v4().simple();
        ResumeRef(format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            random,
            extension
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Raw bytes plus the content type recorded at upload.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Object storage seam. `S3ObjectStore` in production.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError>;

    /// `NotFound` when the key no longer resolves.
    async fn get(&self, key: &str) -> Result<StoredObject, AppError>;
}

/// A resolved resume ready to hand to an admin.
#[derive(Debug, Clone)]
pub struct ResumeDownload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct ResumeTransfer {
    store: Arc<dyn ObjectStore>,
    constraints: ResumeConstraints,
}

impl ResumeTransfer {
    pub fn new(store: Arc<dyn ObjectStore>, constraints: ResumeConstraints) -> Self {
        Self { store, constraints }
    }

    pub fn constraints(&self) -> &ResumeConstraints {
        &self.constraints
    }

    pub async fn upload(&self, upload: ResumeUpload) -> Result<ResumeRef, AppError> {
        let format = self.constraints.check(&upload)?;
        let key = ResumeRef::generate(&key_extension(&upload, format));
        let size = upload.bytes.len();

        self.store
            .put(key.as_str(), upload.bytes, format.mime())
            .await?;

        info!("Stored resume {} ({size} bytes)", key.as_str());
        Ok(key)
    }

    /// `candidate_name` only shapes the suggested filename.
    pub async fn download(&self, key: &str, candidate_name: &str) -> Result<ResumeDownload, AppError> {
        let object = self.store.get(key).await?;
        let extension = key
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or("pdf");
        let content_type = object
            .content_type
            .or_else(|| ResumeFormat::from_extension(extension).map(|f| f.mime().to_string()))
            .unwrap_or_else(|| GENERIC_CONTENT_TYPE.to_string());

        Ok(ResumeDownload {
            file_name: download_file_name(candidate_name, extension),
            content_type,
            bytes: object.bytes,
        })
    }
}

/// Longest filename extension carried into a storage key.
const MAX_KEY_EXTENSION_CHARS: usize = 5;

/// The uploaded filename's extension when it is short, alphanumeric and names
/// the detected format; otherwise the format's canonical extension.
fn key_extension(upload: &ResumeUpload, format: ResumeFormat) -> String {
    upload
        .extension()
        .filter(|ext| {
            ext.len() <= MAX_KEY_EXTENSION_CHARS
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ResumeFormat::from_extension(ext) == Some(format)
        })
        .unwrap_or_else(|| format.extension().to_string())
}

/// `resume_Ana_Silva.pdf`. Characters outside `[A-Za-z0-9_-]` become underscores.
pub fn download_file_name(candidate_name: &str, extension: &str) -> String {
    let words: Vec<String> = candidate_name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                .collect()
        })
        .collect();
    if words.is_empty() {
        format!("resume.{extension}")
    } else {
        format!("resume_{}.{extension}", words.join("_"))
    }
}
