//! Static asset handlers for the upload form
//!
//! Embeds and serves CSS at compile time

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const UPLOAD_FORM_CSS: &str = include_str!("../../../static/upload-form.css");

/// GET /static/upload-form.css
pub async fn serve_upload_form_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        UPLOAD_FORM_CSS,
    )
        .into_response()
}
