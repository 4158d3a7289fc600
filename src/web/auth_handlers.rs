// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, SignupForm},
    services::{
        allotment_service::DEPARTMENTS,
        auth_service,
        user_service::{self, SignupOutcome},
    },
    state::AppState,
    templates::{LoginPage, SignupPage},
    web::{
        mw_auth::{current_user, CurrentUser, SESSION_USER_KEY},
        render_page,
    },
};
use axum::{
    extract::{Extension, Form, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

const LOGIN_FAILED: &str = "Invalid username or password.";

// GET /
pub async fn show_login_form(session: Session) -> AppResult<Response> {
    if current_user(&session).await?.is_some() {
        tracing::debug!("GET /: already logged in, redirecting to /dashboard");
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(render_page(&LoginPage { error: None })?.into_response())
}

// POST /
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for: {}", form.username);

    let authenticated =
        auth_service::authenticate(&state.db_pool, &form.username, &form.password).await?;
    let Some(user) = authenticated else {
        let page = LoginPage { error: Some(LOGIN_FAILED.to_string()) };
        return Ok(render_page(&page)?.into_response());
    };

    let role = user.role().ok_or_else(|| {
        tracing::error!("User '{}' has an unknown role '{}'", user.username, user.role);
        AppError::InternalServerError
    })?;

    let identity = CurrentUser {
        username: user.username,
        department: user.department,
        role,
    };

    // New session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to cycle id: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to write session: {}", e)))?;

    tracing::info!("✅ '{}' logged in ({}).", identity.username, identity.role);
    Ok(Redirect::to("/dashboard").into_response())
}

// GET /signup
pub async fn show_signup_form() -> AppResult<Response> {
    let page = SignupPage { error: None, departments: DEPARTMENTS };
    Ok(render_page(&page)?.into_response())
}

// POST /signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let signup_error = |message: String| -> AppResult<Response> {
        let page = SignupPage { error: Some(message), departments: DEPARTMENTS };
        Ok(render_page(&page)?.into_response())
    };

    let (username, department, role) = match user_service::validate_signup(&form) {
        Ok(fields) => fields,
        Err(AppError::ValidationError(message)) => {
            tracing::warn!("Signup rejected: {}", message);
            return signup_error(message);
        }
        Err(e) => return Err(e),
    };

    let outcome = user_service::create_user(
        &state.db_pool,
        &username,
        &form.password,
        &department,
        role,
        state.config.bcrypt_cost,
    )
    .await?;

    match outcome {
        SignupOutcome::Created => Ok(Redirect::to("/").into_response()),
        SignupOutcome::UsernameTaken => {
            signup_error(format!("Username '{}' is already taken.", username))
        }
    }
}

// GET /dashboard
pub async fn dashboard(Extension(user): Extension<CurrentUser>) -> Redirect {
    Redirect::to(user.role.home())
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let user = current_user(&session).await.ok().flatten();

    session
        .flush()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to clear session: {}", e)))?;

    match user {
        Some(u) => tracing::info!("🚪 '{}' logged out.", u.username),
        None => tracing::info!("🚪 Anonymous session cleared."),
    }
    Ok(Redirect::to("/"))
}
