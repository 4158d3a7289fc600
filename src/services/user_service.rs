// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{Role, SignupForm, User},
    services::{allotment_service::DEPARTMENTS, auth_service},
};
use sqlx::SqlitePool;

/// Outcome of a signup attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum SignupOutcome {
    Created,
    UsernameTaken,
}

pub async fn find_user_by_username(
    db_pool: &SqlitePool,
    username: &str,
) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user: {}", username);
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT username, password_hash, department, role
        FROM users
        WHERE username = ?1
        "#,
    )
    .bind(username)
    .fetch_optional(db_pool)
    .await?;

    if user.is_none() {
        tracing::debug!("User '{}' not found.", username);
    }
    Ok(user)
}

/// Checks signup fields and returns them normalised (trimmed, department in
/// upper case).
pub fn validate_signup(form: &SignupForm) -> AppResult<(String, String, Role)> {
    let username = form.username.trim();
    if username.is_empty() {
        return Err(AppError::ValidationError("username is required".into()));
    }
    if form.password.is_empty() {
        return Err(AppError::ValidationError("password is required".into()));
    }

    let department = form.department.trim().to_ascii_uppercase();
    if !DEPARTMENTS.contains(&department.as_str()) {
        return Err(AppError::ValidationError(format!(
            "unknown department '{}'",
            form.department
        )));
    }

    let role = form
        .role
        .parse::<Role>()
        .map_err(AppError::ValidationError)?;

    Ok((username.to_string(), department, role))
}

pub async fn create_user(
    db_pool: &SqlitePool,
    username: &str,
    raw_password: &str,
    department: &str,
    role: Role,
    bcrypt_cost: u32,
) -> AppResult<SignupOutcome> {
    tracing::info!("Creating user: {}", username);
    let password_hash = auth_service::hash_password(raw_password, bcrypt_cost).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, department, role)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(username)
    .bind(&password_hash)
    .bind(department)
    .bind(role.as_str())
    .execute(db_pool)
    .await;

    match result {
        Ok(_) => {
            tracing::info!("✅ User '{}' created ({}, {}).", username, department, role);
            Ok(SignupOutcome::Created)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::warn!("Signup failed: username '{}' already exists.", username);
            Ok(SignupOutcome::UsernameTaken)
        }
        Err(e) => Err(e.into()),
    }
}
