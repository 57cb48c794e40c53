//! UI Routes - HTML pages for the upload form
//!
//! # Structure
//! - **Page** (`page`): renders a session's state as the form page
//! - **Static Assets** (`static_assets`): embedded stylesheet

use axum::{routing::get, Router};

use crate::AppState;

pub mod page;
mod static_assets;

pub use page::{escape_html, render_page};
use static_assets::serve_upload_form_css;

/// Build static asset routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/static/upload-form.css", get(serve_upload_form_css))
}
