// src/web/report_handlers.rs
use crate::{
    error::AppResult,
    services::{allotment_service, report_service},
    state::AppState,
};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

pub const NO_DATA_MESSAGE: &str = "No allotment data available. Please shuffle first.";

// GET /download_pdf - every stored allotment as an attachment
pub async fn download_pdf(State(state): State<AppState>) -> AppResult<Response> {
    let rows = allotment_service::query_all(&state.db_pool).await?;

    if rows.is_empty() {
        tracing::info!("GET /download_pdf: nothing stored yet.");
        return Ok(NO_DATA_MESSAGE.into_response());
    }

    let report = report_service::export_report(
        state.renderer.clone(),
        &rows,
        &state.config.report_dir,
        &allotment_service::today(),
    )
    .await?;

    let content_type = match state.renderer.extension() {
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.filename),
            ),
        ],
        report.bytes,
    )
        .into_response())
}
