// src/web/mw_role.rs
use crate::{models::user::Role, web::mw_auth::CurrentUser};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Runs after `require_auth`. Sends anyone without the role back to `/`.
async fn require_role(role: Role, user: CurrentUser, request: Request, next: Next) -> Response {
    if user.role == role {
        next.run(request).await
    } else {
        tracing::warn!(
            "Role MW: '{}' ({}) denied access to {} (needs {}).",
            user.username,
            user.role,
            request.uri().path(),
            role
        );
        Redirect::to("/").into_response()
    }
}

pub async fn require_admin(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Response {
    require_role(Role::Admin, user, request, next).await
}

pub async fn require_student(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Response {
    require_role(Role::Student, user, request, next).await
}
