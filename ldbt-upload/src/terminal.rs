//! Terminal front end
//!
//! Walks one session through the same controller the web UI uses and
//! prints each state as a line of text.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::api::ui::page::{PROCESSING_NOTICE, THANK_YOU_MESSAGE};
use crate::controller::UploadFormController;
use crate::models::ArchiveFile;
use crate::session::FormState;

/// One-line description of a state
pub fn describe_state(state: &FormState) -> String {
    match state {
        FormState::Idle => "Select a .zip archive to upload.".to_string(),
        FormState::Uploading { file_name } => format!("Uploading {}...", file_name),
        FormState::Uploaded { transformation_id } => {
            format!("{} (transformation {})", PROCESSING_NOTICE, transformation_id)
        }
        FormState::EmailPending { .. } => "Sending email...".to_string(),
        FormState::EmailSent { .. } => THANK_YOU_MESSAGE.to_string(),
        FormState::Failed { error, .. } => format!("Error: {}", error),
    }
}

/// Upload `archive_path`, then submit an email
///
/// With `email` given, the address is submitted once. Otherwise the user is
/// prompted on `input` until the submission succeeds or input ends.
/// Returns the state the session finished in.
pub async fn run_submit<R: BufRead, W: Write>(
    controller: &UploadFormController,
    archive_path: &Path,
    email: Option<String>,
    input: &mut R,
    out: &mut W,
) -> Result<FormState> {
    let session = controller.open_session().await;

    let archive = ArchiveFile::read(archive_path)
        .await
        .with_context(|| format!("Failed to read archive {}", archive_path.display()))?;

    writeln!(
        out,
        "{}",
        describe_state(&FormState::Uploading {
            file_name: archive.file_name.clone()
        })
    )?;
    let mut state = controller.submit_upload(session.id, Some(archive)).await?;
    writeln!(out, "{}", describe_state(&state))?;

    if !matches!(state, FormState::Uploaded { .. }) {
        return Ok(state);
    }

    if let Some(address) = email {
        state = controller.submit_email(session.id, &address).await?;
        writeln!(out, "{}", describe_state(&state))?;
        return Ok(state);
    }

    loop {
        write!(out, "Email: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(state);
        }
        let address = line.trim_end_matches(|c: char| c == '\r' || c == '\n');

        state = controller.submit_email(session.id, address).await?;
        writeln!(out, "{}", describe_state(&state))?;
        if state.is_terminal() {
            return Ok(state);
        }
    }
}
