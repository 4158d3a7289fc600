// src/web/student_handlers.rs
use crate::{
    error::AppResult,
    services::allotment_service,
    state::AppState,
    templates::StudentPage,
    web::{mw_auth::CurrentUser, render_page},
};
use axum::{
    extract::{Extension, State},
    response::Html,
};

// GET /student - every allotment of the student's department
pub async fn student_page(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    tracing::debug!("GET /student: '{}' ({})", user.username, user.department);

    let rows = allotment_service::query_by_department(&state.db_pool, &user.department).await?;

    render_page(&StudentPage {
        username: user.username,
        department: user.department,
        rows,
    })
}
