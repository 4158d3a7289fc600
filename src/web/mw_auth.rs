// src/web/mw_auth.rs
use crate::{error::AppError, models::user::Role};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use time::Duration;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

/// Session key holding the logged-in identity.
pub const SESSION_USER_KEY: &str = "user";

/// Authenticated identity of the current request. Stored in the session at
/// login and handed to handlers as a request extension.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub department: String,
    pub role: Role,
}

pub fn session_layer(store: SqliteStore, inactivity_days: i64) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(inactivity_days)))
}

/// Reads the identity from the session, if any.
pub async fn current_user(session: &Session) -> Result<Option<CurrentUser>, AppError> {
    session
        .get::<CurrentUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to read session: {}", e)))
}

// Lets the request through only when someone is logged in
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match current_user(&session).await? {
        Some(user) => {
            tracing::debug!("Auth MW: '{}' authenticated as {}.", user.username, user.role);
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!("Auth MW: not authenticated, redirecting to /");
            Ok(Redirect::to("/").into_response())
        }
    }
}
