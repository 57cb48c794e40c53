//! Upload payload model

use std::fmt;
use std::path::Path;

/// Content type sent when the browser or filesystem gives none
pub const DEFAULT_ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// A selected archive, held only for the duration of its upload
///
/// Content past the upload limit is never buffered: such an archive is
/// carried as its byte count only (see [`ArchiveFile::oversized`]).
#[derive(Clone)]
pub struct ArchiveFile {
    pub file_name: String,
    pub content_type: Option<String>,
    bytes: Vec<u8>,
    size_bytes: u64,
}

impl ArchiveFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }

    /// An archive whose content was discarded, known only by its size
    pub fn oversized(file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: Vec::new(),
            size_bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read an archive from disk, named after the path's final component
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive.zip".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// Size of the selected archive, including any discarded content
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.size_bytes == 0
    }

    /// True when every byte of the archive is held
    pub fn is_complete(&self) -> bool {
        self.bytes.len() as u64 == self.size_bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_ARCHIVE_CONTENT_TYPE)
    }
}

// Archives run to megabytes; never dump the payload into logs
impl fmt::Debug for ArchiveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}
