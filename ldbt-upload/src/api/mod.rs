//! HTTP routes for the upload form web UI

mod form;
mod health;
pub mod ui;

pub use form::{form_routes, EmailSubmission};
pub use health::{health_routes, HealthResponse};
pub use ui::ui_routes;
