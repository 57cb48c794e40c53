//! Transformation service API definitions
//!
//! Request/response shapes shared by the client and its test stand-ins.

pub mod types;

pub use types::{SetEmailRequest, TransformationId, UploadArchiveResponse};

/// Path of the archive upload endpoint, relative to the API base URL
pub const UPLOAD_ARCHIVE_PATH: &str = "file/upload-archive";

/// Path of the set-email endpoint, relative to the API base URL
pub const SET_EMAIL_PATH: &str = "file/set-email";

/// Multipart field name carrying the archive
pub const ARCHIVE_FIELD: &str = "file";
