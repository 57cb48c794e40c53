//! ldbt-upload library interface
//!
//! Archive upload form for the LookML to DBT transformation service:
//! upload a zip archive, then leave an email address to be notified when
//! processing completes.
//!
//! Exposes public APIs for the binary and for integration testing.

pub mod api;
pub mod client;
pub mod controller;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod terminal;
pub mod validation;

pub use crate::controller::UploadFormController;
pub use crate::error::{ApiError, FormError, SubmitError};
pub use crate::session::{FormState, Session};

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Form controller (owns the session store)
    pub controller: UploadFormController,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(controller: UploadFormController) -> Self {
        Self {
            controller,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::form_routes())
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
