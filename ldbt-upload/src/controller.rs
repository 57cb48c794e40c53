//! Upload form controller
//!
//! Drives a [`Session`](crate::session::Session) through its two network
//! calls. Each submission is begin (under the session lock) → remote call
//! (lock released) → complete (under the lock again). Validation failures
//! and rejections never reach the remote service, and nothing is retried
//! automatically.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::TransformationApi;
use crate::error::{FormError, SubmitError};
use crate::models::ArchiveFile;
use crate::session::{FormState, Session};
use crate::store::SessionStore;

/// Upload form controller shared by the web UI and the terminal front end
#[derive(Clone)]
pub struct UploadFormController {
    api: Arc<dyn TransformationApi>,
    sessions: SessionStore,
    /// Most recent remote failure, for diagnostics
    last_error: Arc<RwLock<Option<String>>>,
}

impl UploadFormController {
    pub fn new(api: Arc<dyn TransformationApi>, sessions: SessionStore) -> Self {
        Self {
            api,
            sessions,
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Start a fresh session (page load)
    pub async fn open_session(&self) -> Session {
        self.sessions.create().await
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Validate and upload an archive, returning the resulting state
    ///
    /// `Ok` carries `Uploaded` or `Failed`; `Err` means nothing was attempted
    /// and the session state is unchanged.
    pub async fn submit_upload(
        &self,
        session_id: Uuid,
        file: Option<ArchiveFile>,
    ) -> Result<FormState, SubmitError> {
        let begun = self
            .sessions
            .update(session_id, |session| session.begin_upload(file))
            .await
            .ok_or(SubmitError::SessionNotFound(session_id))?;

        let archive = match begun {
            Ok(archive) => archive,
            Err(error) if error.is_rejection() => {
                warn!(%session_id, %error, "Upload rejected");
                return Err(SubmitError::Rejected(error));
            }
            Err(error) => {
                info!(%session_id, %error, "Upload blocked by validation");
                return self.state_of(session_id).await;
            }
        };

        info!(
            %session_id,
            file_name = %archive.file_name,
            size_bytes = archive.size_bytes(),
            "Uploading archive"
        );

        let outcome = match self.api.upload_archive(archive).await {
            Ok(response) => {
                info!(
                    %session_id,
                    transformation_id = %response.transformation_id,
                    "Archive accepted"
                );
                Ok(response.transformation_id)
            }
            Err(e) => {
                warn!(%session_id, error = %e, "Archive upload failed");
                self.record_error(e.to_string()).await;
                Err(e.to_string())
            }
        };

        self.complete(session_id, |session| session.complete_upload(outcome))
            .await
    }

    /// Validate and submit an email for the session's transformation
    ///
    /// Same contract as [`submit_upload`](Self::submit_upload).
    pub async fn submit_email(
        &self,
        session_id: Uuid,
        address: &str,
    ) -> Result<FormState, SubmitError> {
        let begun = self
            .sessions
            .update(session_id, |session| session.begin_email(address))
            .await
            .ok_or(SubmitError::SessionNotFound(session_id))?;

        let request = match begun {
            Ok(request) => request,
            Err(error) if error.is_rejection() => {
                warn!(%session_id, %error, "Email submission rejected");
                return Err(SubmitError::Rejected(error));
            }
            Err(error) => {
                info!(%session_id, %error, "Email blocked by validation");
                return self.state_of(session_id).await;
            }
        };

        let transformation_id = request.transformation_id.clone();
        info!(%session_id, %transformation_id, "Submitting email");

        let outcome = match self.api.set_email(&request).await {
            Ok(()) => {
                info!(%session_id, %transformation_id, "Email recorded");
                Ok(())
            }
            Err(e) => {
                warn!(%session_id, %transformation_id, error = %e, "Email submission failed");
                self.record_error(e.to_string()).await;
                Err(e.to_string())
            }
        };

        self.complete(session_id, |session| session.complete_email(outcome))
            .await
    }

    async fn complete(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<(), FormError>,
    ) -> Result<FormState, SubmitError> {
        self.sessions
            .update(session_id, |session| {
                f(session).map(|()| session.state().clone())
            })
            .await
            .ok_or(SubmitError::SessionNotFound(session_id))?
            .map_err(SubmitError::Rejected)
    }

    async fn state_of(&self, session_id: Uuid) -> Result<FormState, SubmitError> {
        self.sessions
            .get(session_id)
            .await
            .map(|session| session.state().clone())
            .ok_or(SubmitError::SessionNotFound(session_id))
    }

    async fn record_error(&self, message: String) {
        *self.last_error.write().await = Some(message);
    }
}
