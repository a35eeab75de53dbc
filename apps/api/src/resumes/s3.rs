use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::errors::AppError;
use crate::resumes::{ObjectStore, StoredObject};

/// `ObjectStore` backed by an S3-compatible bucket (MinIO locally).
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("S3 upload failed: {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, AppError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(err) if err.is_no_such_key() => {
                    AppError::NotFound(format!("Resume {key} not found"))
                }
                _ => AppError::Transport(format!("S3 download failed: {e}")),
            })?;

        let content_type = output.content_type().map(str::to_string);
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::Transport(format!("S3 body read failed: {e}")))?
            .into_bytes();

        Ok(StoredObject {
            bytes,
            content_type,
        })
    }
}
