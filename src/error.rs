// src/error.rs
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to process password")]
    PasswordHashingError,

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    // Natural key (department, year, section, day) already present.
    #[error("Allotment already exists for {department}/{year}/{section} on {day}")]
    DuplicateAllotment {
        department: String,
        year: String,
        section: String,
        day: String,
    },

    #[error("Room pool is empty")]
    EmptyRoomPool,

    #[error("Nothing to export")]
    EmptyInput,

    #[error("Report rendering failed: {0}")]
    ReportError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unexpected internal error")]
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Full detail goes to the log, the user gets a generic message
        tracing::error!("Handled error: {:?}", self);

        let (status, user_message) = match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not access the data.")
            }
            AppError::ConfigError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error.")
            }
            AppError::PasswordHashingError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not process credentials.")
            }
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not manage your session.")
            }
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Invalid form data."),
            AppError::DuplicateAllotment { .. } => {
                (StatusCode::CONFLICT, "An allotment for that class already exists.")
            }
            AppError::EmptyRoomPool => {
                (StatusCode::INTERNAL_SERVER_ERROR, "No rooms are configured.")
            }
            AppError::EmptyInput => (StatusCode::NOT_FOUND, "Nothing to export."),
            AppError::ReportError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not generate the report.")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred."),
        };

        let page = format!(
            r#"<!DOCTYPE html>
<html><head><title>Error</title><style>body{{font-family:sans-serif;}}</style></head>
<body><h1>Error {status_code}</h1><p>{message}</p>
<a href="javascript:history.back()">Back</a></body></html>"#,
            status_code = status.as_u16(),
            message = user_message
        );
        (status, Html(page)).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;
