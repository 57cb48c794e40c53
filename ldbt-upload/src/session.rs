//! Upload session state machine
//!
//! One [`Session`] per page load. The form is modelled as a single tagged
//! [`FormState`] so impossible combinations (uploaded and uploading at once,
//! an email in flight without a transformation id) cannot be represented.
//!
//! ```text
//! Idle ──► Uploading ──► Uploaded ──► EmailPending ──► EmailSent
//!   ▲          │            ▲              │
//!   │          ▼            │              ▼
//!   └── Failed{id: None}    └──── Failed{id: Some}
//! ```
//!
//! Transitions are synchronous so callers can hold a session lock for the
//! transition only and release it before awaiting the network.

use chrono::{DateTime, Utc};
use ldbt_common::api::{SetEmailRequest, TransformationId};
use uuid::Uuid;

use crate::error::FormError;
use crate::models::ArchiveFile;
use crate::validation::{validate_email, validate_file};

/// Current state of the upload form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Waiting for an archive (initial)
    Idle,
    /// Archive upload in flight
    Uploading { file_name: String },
    /// Service accepted the archive; waiting for an email address
    Uploaded { transformation_id: TransformationId },
    /// Email submission in flight
    EmailPending {
        transformation_id: TransformationId,
        email: String,
    },
    /// Email recorded (terminal)
    EmailSent {
        transformation_id: TransformationId,
        email: String,
    },
    /// Last submission failed. `transformation_id: None` returns control to
    /// the file form, `Some` to the email form.
    Failed {
        transformation_id: Option<TransformationId>,
        error: FormError,
    },
}

/// Upload progress projected from [`FormState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading,
    Uploaded,
    Failed,
}

/// Email progress projected from [`FormState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailState {
    NotSent,
    Sending,
    Sent,
    Failed,
}

impl FormState {
    /// Human-readable state name, used in messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            FormState::Idle => "idle",
            FormState::Uploading { .. } => "uploading",
            FormState::Uploaded { .. } => "uploaded",
            FormState::EmailPending { .. } => "sending email",
            FormState::EmailSent { .. } => "email sent",
            FormState::Failed { .. } => "failed",
        }
    }

    /// Server-issued id, present from `Uploaded` onwards
    pub fn transformation_id(&self) -> Option<&TransformationId> {
        match self {
            FormState::Idle | FormState::Uploading { .. } => None,
            FormState::Uploaded { transformation_id }
            | FormState::EmailPending {
                transformation_id, ..
            }
            | FormState::EmailSent {
                transformation_id, ..
            } => Some(transformation_id),
            FormState::Failed {
                transformation_id, ..
            } => transformation_id.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&FormError> {
        match self {
            FormState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Inline error text for the active form
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            FormState::Uploading { .. } | FormState::EmailPending { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FormState::EmailSent { .. })
    }

    /// True while the file form (not the email form) is the active one
    pub fn shows_file_form(&self) -> bool {
        self.transformation_id().is_none()
    }

    pub fn upload_state(&self) -> UploadState {
        match self {
            FormState::Idle => UploadState::Idle,
            FormState::Uploading { .. } => UploadState::Uploading,
            FormState::Failed {
                transformation_id: None,
                ..
            } => UploadState::Failed,
            _ => UploadState::Uploaded,
        }
    }

    pub fn email_state(&self) -> EmailState {
        match self {
            FormState::EmailPending { .. } => EmailState::Sending,
            FormState::EmailSent { .. } => EmailState::Sent,
            FormState::Failed {
                transformation_id: Some(_),
                ..
            } => EmailState::Failed,
            _ => EmailState::NotSent,
        }
    }
}

/// Client-side state for one visit
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    state: FormState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session in `Idle`
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Validate the selection and enter `Uploading`
    ///
    /// Hands the archive back for the caller to send. A validation failure
    /// moves the session to `Failed { transformation_id: None }`; a rejection
    /// (see [`FormError::is_rejection`]) leaves it untouched.
    pub fn begin_upload(&mut self, file: Option<ArchiveFile>) -> Result<ArchiveFile, FormError> {
        match &self.state {
            FormState::Idle
            | FormState::Failed {
                transformation_id: None,
                ..
            } => {}
            state if state.is_in_flight() => return Err(FormError::RequestInFlight),
            state => {
                return Err(FormError::InvalidTransition {
                    action: "upload an archive",
                    state: state.name(),
                })
            }
        }

        if let Err(error) = validate_file(file.as_ref()) {
            self.fail(None, error.clone());
            return Err(error);
        }

        match file {
            Some(file) => {
                self.state = FormState::Uploading {
                    file_name: file.file_name.clone(),
                };
                Ok(file)
            }
            None => {
                self.fail(None, FormError::FileRequired);
                Err(FormError::FileRequired)
            }
        }
    }

    /// Resolve the in-flight upload with the service's answer
    pub fn complete_upload(
        &mut self,
        outcome: Result<TransformationId, String>,
    ) -> Result<(), FormError> {
        if !matches!(self.state, FormState::Uploading { .. }) {
            return Err(FormError::InvalidTransition {
                action: "complete an upload",
                state: self.state.name(),
            });
        }

        self.state = match outcome {
            Ok(transformation_id) => FormState::Uploaded { transformation_id },
            Err(message) => FormState::Failed {
                transformation_id: None,
                error: FormError::NetworkOrServer(message),
            },
        };
        Ok(())
    }

    /// Validate the address and enter `EmailPending`
    ///
    /// Returns the request body to send. Requires a transformation id; a
    /// validation failure keeps the email form active with the error shown.
    pub fn begin_email(&mut self, address: &str) -> Result<SetEmailRequest, FormError> {
        let transformation_id = match &self.state {
            FormState::Uploaded { transformation_id }
            | FormState::Failed {
                transformation_id: Some(transformation_id),
                ..
            } => transformation_id.clone(),
            state if state.is_in_flight() => return Err(FormError::RequestInFlight),
            state => {
                return Err(FormError::InvalidTransition {
                    action: "submit an email",
                    state: state.name(),
                })
            }
        };

        if let Err(error) = validate_email(address) {
            self.fail(Some(transformation_id), error.clone());
            return Err(error);
        }

        self.state = FormState::EmailPending {
            transformation_id: transformation_id.clone(),
            email: address.to_string(),
        };
        Ok(SetEmailRequest {
            transformation_id,
            email: address.to_string(),
        })
    }

    /// Resolve the in-flight email submission
    pub fn complete_email(&mut self, outcome: Result<(), String>) -> Result<(), FormError> {
        let (transformation_id, email) = match &self.state {
            FormState::EmailPending {
                transformation_id,
                email,
            } => (transformation_id.clone(), email.clone()),
            state => {
                return Err(FormError::InvalidTransition {
                    action: "complete an email submission",
                    state: state.name(),
                })
            }
        };

        self.state = match outcome {
            Ok(()) => FormState::EmailSent {
                transformation_id,
                email,
            },
            Err(message) => FormState::Failed {
                transformation_id: Some(transformation_id),
                error: FormError::NetworkOrServer(message),
            },
        };
        Ok(())
    }

    fn fail(&mut self, transformation_id: Option<TransformationId>, error: FormError) {
        self.state = FormState::Failed {
            transformation_id,
            error,
        };
    }
}
