// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::allotment::UpdateRoomForm,
    services::allotment_service::{self, DEPARTMENTS, SECTIONS, YEARS},
    state::AppState,
    templates::AdminPage,
    web::{mw_auth::CurrentUser, render_page},
};
use axum::{
    extract::{Extension, Form, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct FeedbackParams {
    success: Option<String>,
    error: Option<String>,
}

fn redirect_with(kind: &str, message: &str) -> Redirect {
    Redirect::to(&format!("/admin?{}={}", kind, urlencoding::encode(message)))
}

// GET /admin - today's allotment
pub async fn show_admin_page(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<Html<String>> {
    let day = allotment_service::today();
    tracing::debug!("GET /admin: loading allotment for {}", day);

    let rows = allotment_service::query_by_day(&state.db_pool, &day).await?;

    render_page(&AdminPage {
        username: user.username,
        day,
        rows,
        departments: DEPARTMENTS,
        years: YEARS,
        sections: SECTIONS,
        success_message: params.success,
        error_message: params.error,
    })
}

// POST /admin - reshuffle today
pub async fn handle_shuffle(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Redirect> {
    let day = allotment_service::today();
    tracing::info!("POST /admin: '{}' requested a shuffle for {}", user.username, day);

    // One run at a time
    let _guard = state.allotment_lock.lock().await;

    match allotment_service::run_allotment(&state.db_pool, &day).await {
        Ok(written) => Ok(redirect_with(
            "success",
            &format!("{} classes allotted for {}.", written, day),
        )),
        Err(AppError::EmptyRoomPool) => Ok(redirect_with("error", "No rooms are configured.")),
        Err(e) => {
            tracing::error!("Allotment run for {} failed: {:?}", day, e);
            Err(e)
        }
    }
}

fn validate_update(form: &UpdateRoomForm) -> AppResult<(String, String)> {
    let day = allotment_service::parse_day(&form.day)?;
    let room = allotment_service::parse_room(&form.room)?;
    if !DEPARTMENTS.contains(&form.department.as_str())
        || !YEARS.contains(&form.year.as_str())
        || !SECTIONS.contains(&form.section.as_str())
    {
        return Err(AppError::ValidationError(format!(
            "unknown class {}/{}/{}",
            form.department, form.year, form.section
        )));
    }
    Ok((day, room))
}

// POST /update - manual room override
pub async fn handle_update(
    State(state): State<AppState>,
    Form(form): Form<UpdateRoomForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /update: {:?}", form);

    let (day, room) = match validate_update(&form) {
        Ok(valid) => valid,
        Err(AppError::ValidationError(message)) => {
            tracing::warn!("Update rejected: {}", message);
            return Ok(redirect_with("error", &format!("Invalid update: {}.", message)));
        }
        Err(e) => return Err(e),
    };

    let updated = allotment_service::update_room(
        &state.db_pool,
        &form.department,
        &form.year,
        &form.section,
        &day,
        &room,
    )
    .await?;

    if updated == 0 {
        Ok(redirect_with(
            "error",
            &format!(
                "No allotment found for {} {} {} on {}.",
                form.department, form.year, form.section, day
            ),
        ))
    } else {
        Ok(redirect_with(
            "success",
            &format!(
                "{} {} {} on {} moved to {}.",
                form.department, form.year, form.section, day, room
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(day: &str, room: &str, section: &str) -> UpdateRoomForm {
        UpdateRoomForm {
            department: "CSE".into(),
            year: "3rd".into(),
            section: section.into(),
            day: day.into(),
            room: room.into(),
        }
    }

    #[test]
    fn update_form_is_validated() {
        assert_eq!(
            validate_update(&form("2025-03-14", " LAB05 ", "B")).unwrap(),
            ("2025-03-14".to_string(), "LAB05".to_string())
        );
        assert!(validate_update(&form("tomorrow", "LAB05", "B")).is_err());
        assert!(validate_update(&form("2025-03-14", "  ", "B")).is_err());
        assert!(validate_update(&form("2025-03-14", "LAB05", "Z")).is_err());
        assert!(validate_update(&form("2025-03-14", "教室101", "B")).is_err());
        assert!(validate_update(&form("2025-03-14", "Lab-Δ1", "B")).is_err());
        assert!(validate_update(&form("2025-03-14", "Main Auditorium West", "B")).is_err());
    }
}
