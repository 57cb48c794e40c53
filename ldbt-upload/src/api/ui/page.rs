//! Upload form page rendering
//!
//! One page, four views, picked from the session's [`FormState`]:
//! file form, email form, either of them busy, and the thank-you view.
//! No client-side scripting: forms post back and the server renders the
//! next state. While a request is in flight the page refreshes itself.

use ldbt_common::api::ARCHIVE_FIELD;

use crate::error::FormError;
use crate::session::{FormState, Session};

const MAIN_SITE_URL: &str = "https://atad.ml";
const LINKEDIN_URL: &str = "https://www.linkedin.com/company/atadml";
const QUORA_URL: &str = "https://2023dlaunch.quora.com/";

pub const PROCESSING_NOTICE: &str =
    "The files are being processed, enter your email and we will contact you when it is complete.";
pub const THANK_YOU_MESSAGE: &str = "Thank you! We will contact you within 24 hours.";
const INSTRUCTIONS: &str = "Instructions: Export your LookML project as a zip archive from GitHub and upload the file here.";

/// Render the full page for a session
///
/// `notice` overrides the inline error slot, for rejections that did not
/// change the state (e.g. a second click while uploading).
pub fn render_page(session: &Session, notice: Option<&FormError>) -> String {
    let state = session.state();
    let error = notice
        .map(ToString::to_string)
        .or_else(|| state.error_message())
        .unwrap_or_default();

    let body = match state {
        FormState::EmailSent { .. } => format!(
            r#"<span class="text-notification" id="thank-you">{}</span>"#,
            THANK_YOU_MESSAGE
        ),
        _ if state.shows_file_form() => file_form(session, &error),
        _ => email_form(session, &error),
    };

    let instructions = if state.shows_file_form() {
        format!(r#"<p class="instructions">{}</p>"#, INSTRUCTIONS)
    } else {
        String::new()
    };

    // Poll the session page until the in-flight request resolves; the
    // current URL may be a POST-only route
    let refresh = if state.is_in_flight() {
        format!(
            r#"<meta http-equiv="refresh" content="2; url=/session/{}">"#,
            session.id
        )
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {refresh}
    <title>LookML to DBT Transformer</title>
    <link rel="stylesheet" href="/static/upload-form.css">
</head>
<body data-state="{state_name}">
    <main class="page">
        <h1>LookML to DBT Transformer</h1>
        <p class="tagline">Transform your LookML git-based projects into DBT style code seamlessly.</p>
        {body}
        <div class="links">
            {instructions}
            <a href="{main_site}" class="main-link">Go to main page</a>
        </div>
        <footer>
            <a href="{linkedin}" aria-label="LinkedIn" class="social linkedin">in</a>
            <a href="{quora}" aria-label="Quora" class="social quora">Q</a>
        </footer>
        <div class="build-info">ldbt-upload v{version} ({git_hash})</div>
    </main>
</body>
</html>
"#,
        refresh = refresh,
        state_name = escape_html(state.name()),
        body = body,
        instructions = instructions,
        main_site = MAIN_SITE_URL,
        linkedin = LINKEDIN_URL,
        quora = QUORA_URL,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
    )
}

fn file_form(session: &Session, error: &str) -> String {
    let busy = session.state().is_in_flight();
    format!(
        r#"<form class="hook-form" id="file-form" method="post" action="/upload" enctype="multipart/form-data">
            <input type="hidden" name="session_id" value="{session_id}">
            <input type="file" class="input-file" name="{field}" accept=".zip" required{disabled}>
            {action}
            <span class="error">{error}</span>
        </form>"#,
        session_id = session.id,
        field = ARCHIVE_FIELD,
        disabled = if busy { " disabled" } else { "" },
        action = submit_or_spinner(busy, "Upload Project"),
        error = escape_html(error),
    )
}

fn email_form(session: &Session, error: &str) -> String {
    let state = session.state();
    let busy = state.is_in_flight();
    let value = match state {
        FormState::EmailPending { email, .. } => email.as_str(),
        _ => "",
    };
    format!(
        r#"<form class="hook-form" id="email-form" method="post" action="/email">
            <span class="text-notification">{notice}</span>
            <input type="hidden" name="session_id" value="{session_id}">
            <input type="text" class="input-field" name="email" placeholder="Enter your email" value="{value}"{disabled}>
            {action}
            <span class="error">{error}</span>
        </form>"#,
        notice = PROCESSING_NOTICE,
        session_id = session.id,
        value = escape_html(value),
        disabled = if busy { " disabled" } else { "" },
        action = submit_or_spinner(busy, "Send email"),
        error = escape_html(error),
    )
}

fn submit_or_spinner(busy: bool, label: &str) -> String {
    if busy {
        r#"<div class="spinner-wrap" role="status"><div class="spinner" aria-hidden="true"></div><span class="sr-only">Loading...</span></div>"#
            .to_string()
    } else {
        format!(r#"<button type="submit" class="submit-button">{}</button>"#, label)
    }
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
