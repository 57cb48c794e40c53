//! Transformation service request/response types
//!
//! Field names follow the service's camelCase JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Opaque identifier issued by the transformation service for an accepted archive
///
/// Used to correlate the later email submission with the upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformationId(String);

impl TransformationId {
    /// Wrap a server-issued identifier, rejecting blank values
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::InvalidInput(
                "transformationId must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransformationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Success body of `POST {base}/file/upload-archive`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadArchiveResponse {
    pub transformation_id: TransformationId,
}

/// JSON body of `PATCH {base}/file/set-email`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEmailRequest {
    pub transformation_id: TransformationId,
    pub email: String,
}
