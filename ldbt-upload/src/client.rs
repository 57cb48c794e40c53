//! Transformation service API client
//!
//! Two calls against a fixed base URL:
//! - `POST {base}/file/upload-archive` (multipart, field `file`)
//! - `PATCH {base}/file/set-email` (JSON)

use async_trait::async_trait;
use ldbt_common::api::{
    SetEmailRequest, TransformationId, UploadArchiveResponse, ARCHIVE_FIELD, SET_EMAIL_PATH,
    UPLOAD_ARCHIVE_PATH,
};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use thiserror::Error;

use crate::models::ArchiveFile;

const USER_AGENT: &str = concat!("ldbt-upload/", env!("CARGO_PKG_VERSION"));

/// Transformation service errors
///
/// `Display` is shown to the user verbatim.
#[derive(Debug, Error)]
pub enum TransformerError {
    /// Transport failure (DNS, connect, timeout, reset)
    #[error("{0}")]
    Network(String),

    /// Non-2xx response
    #[error("Request failed with status code {0}")]
    Status(u16),

    /// Request could not be assembled (e.g. malformed content type)
    #[error("Could not build request: {0}")]
    Request(String),

    /// 2xx response with an unusable body
    #[error("Unexpected response from transformation service: {0}")]
    Parse(String),
}

/// Seam between the form controller and the remote service
#[async_trait]
pub trait TransformationApi: Send + Sync {
    /// Upload an archive; the service answers with a transformation id
    async fn upload_archive(
        &self,
        archive: ArchiveFile,
    ) -> Result<UploadArchiveResponse, TransformerError>;

    /// Attach an email address to a transformation
    async fn set_email(&self, request: &SetEmailRequest) -> Result<(), TransformerError>;
}

/// reqwest-backed client for the transformation service
pub struct TransformerClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl TransformerClient {
    /// `base_url` is used as given minus any trailing slash
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransformerError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TransformerError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl TransformationApi for TransformerClient {
    async fn upload_archive(
        &self,
        archive: ArchiveFile,
    ) -> Result<UploadArchiveResponse, TransformerError> {
        if !archive.is_complete() {
            return Err(TransformerError::Request(format!(
                "content of {} was discarded",
                archive.file_name
            )));
        }

        let content_type = archive.content_type_or_default().to_string();
        let size_bytes = archive.size_bytes();
        let file_name = archive.file_name.clone();

        let part = Part::bytes(archive.into_bytes())
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| TransformerError::Request(e.to_string()))?;
        let form = Form::new().part(ARCHIVE_FIELD, part);

        tracing::debug!(size_bytes, "POST {}", UPLOAD_ARCHIVE_PATH);

        let response = self
            .http_client
            .post(self.endpoint(UPLOAD_ARCHIVE_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransformerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Archive upload rejected");
            return Err(TransformerError::Status(status.as_u16()));
        }

        let body: UploadArchiveResponse = response
            .json()
            .await
            .map_err(|e| TransformerError::Parse(e.to_string()))?;

        // The id is opaque but must be usable for the follow-up call
        let transformation_id = TransformationId::parse(body.transformation_id.as_str())
            .map_err(|e| TransformerError::Parse(e.to_string()))?;

        Ok(UploadArchiveResponse { transformation_id })
    }

    async fn set_email(&self, request: &SetEmailRequest) -> Result<(), TransformerError> {
        tracing::debug!(
            transformation_id = %request.transformation_id,
            "PATCH {}",
            SET_EMAIL_PATH
        );

        let response = self
            .http_client
            .patch(self.endpoint(SET_EMAIL_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| TransformerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Email submission rejected");
            return Err(TransformerError::Status(status.as_u16()));
        }

        Ok(())
    }
}
