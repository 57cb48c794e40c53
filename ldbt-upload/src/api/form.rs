//! Upload form handlers
//!
//! Every page load starts a fresh session; form posts run one controller
//! submission and render the state it leaves behind.

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use ldbt_common::api::ARCHIVE_FIELD;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::api::ui::render_page;
use crate::error::{ApiError, SubmitError};
use crate::models::ArchiveFile;
use crate::session::FormState;
use crate::validation::MAX_ARCHIVE_BYTES;
use crate::AppState;

/// Email form body
#[derive(Debug, Deserialize)]
pub struct EmailSubmission {
    pub session_id: Uuid,
    #[serde(default)]
    pub email: String,
}

/// GET /
///
/// Page load: new session, file form
pub async fn new_session_page(State(state): State<AppState>) -> Html<String> {
    let session = state.controller.open_session().await;
    Html(render_page(&session, None))
}

/// GET /session/:id
///
/// Current state of an existing session; unknown ids start over
pub async fn session_page(State(state): State<AppState>, Path(session_id): Path<Uuid>) -> Response {
    match state.controller.sessions().get(session_id).await {
        Some(session) => Html(render_page(&session, None)).into_response(),
        None => Redirect::to("/").into_response(),
    }
}

/// POST /upload
///
/// multipart/form-data with `session_id` and the archive field
pub async fn submit_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut session_id = None;
    let mut archive = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("session_id") => {
                let raw = field.text().await?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|e| ApiError::BadRequest(format!("invalid session_id: {}", e)))?;
                session_id = Some(id);
            }
            Some(ARCHIVE_FIELD) => {
                let content_type = field.content_type().map(str::to_string);
                let file = read_archive_field(field).await?;

                // Browsers send an empty, unnamed part when nothing was picked
                if file.file_name.is_empty() && file.is_empty() {
                    continue;
                }

                archive = Some(match content_type {
                    Some(content_type) => file.with_content_type(content_type),
                    None => file,
                });
            }
            other => debug!(field = ?other, "Ignoring unexpected form field"),
        }
    }

    let session_id =
        session_id.ok_or_else(|| ApiError::BadRequest("missing session_id".to_string()))?;

    let result = state.controller.submit_upload(session_id, archive).await;
    Ok(render_outcome(&state, session_id, result).await)
}

/// Buffer the archive field up to the upload limit
///
/// Past the limit the rest of the field is only counted, so an oversized
/// archive reaches validation as a size without being held in memory.
async fn read_archive_field(mut field: Field<'_>) -> Result<ArchiveFile, ApiError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let mut bytes = Vec::new();
    let mut size_bytes: u64 = 0;

    while let Some(chunk) = field.chunk().await? {
        size_bytes += chunk.len() as u64;
        if size_bytes <= MAX_ARCHIVE_BYTES {
            bytes.extend_from_slice(&chunk);
        } else {
            bytes = Vec::new();
        }
    }

    if size_bytes > MAX_ARCHIVE_BYTES {
        debug!(%file_name, size_bytes, "Archive over the limit, content discarded");
        return Ok(ArchiveFile::oversized(file_name, size_bytes));
    }
    Ok(ArchiveFile::new(file_name, bytes))
}

/// POST /email
///
/// urlencoded `session_id`, `email`
pub async fn submit_email(
    State(state): State<AppState>,
    Form(submission): Form<EmailSubmission>,
) -> Response {
    let result = state
        .controller
        .submit_email(submission.session_id, &submission.email)
        .await;
    render_outcome(&state, submission.session_id, result).await
}

/// Render the page after a submission
///
/// Rejections re-render the unchanged state with the reason and a 409.
async fn render_outcome(
    state: &AppState,
    session_id: Uuid,
    result: Result<FormState, SubmitError>,
) -> Response {
    let session = match state.controller.sessions().get(session_id).await {
        Some(session) => session,
        None => return Redirect::to("/").into_response(),
    };

    match result {
        Ok(_) => Html(render_page(&session, None)).into_response(),
        Err(SubmitError::Rejected(reason)) => {
            (StatusCode::CONFLICT, Html(render_page(&session, Some(&reason)))).into_response()
        }
        Err(SubmitError::SessionNotFound(_)) => Redirect::to("/").into_response(),
    }
}

/// Build form routes
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(new_session_page))
        .route("/session/:id", get(session_page))
        // Archive size is enforced while streaming the field, not by body limit
        .route(
            "/upload",
            post(submit_upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/email", post(submit_email))
}
