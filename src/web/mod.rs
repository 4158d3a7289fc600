// src/web/mod.rs
pub mod admin_handlers;
pub mod auth_handlers;
pub mod mw_auth;
pub mod mw_role;
pub mod report_handlers;
pub mod routes;
pub mod student_handlers;

use crate::error::{AppError, AppResult};
use askama::Template;
use axum::response::Html;

/// Renders an askama page, logging the template error on failure.
pub fn render_page<T: Template>(template: &T) -> AppResult<Html<String>> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Failed to render template: {}", e);
        AppError::InternalServerError
    })
}
