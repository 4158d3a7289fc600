// src/services/allotment_service.rs
use crate::{
    error::{AppError, AppResult},
    models::allotment::Allotment,
    services::room_pool,
};
use chrono::NaiveDate;
use sqlx::{Executor, Sqlite, SqlitePool};

pub const DEPARTMENTS: &[&str] = &["CSE", "ECE", "MECH", "CIVIL", "EEE"];
pub const YEARS: &[&str] = &["1st", "2nd", "3rd", "4th"];
pub const SECTIONS: &[&str] = &["A", "B", "C", "D", "E"];

pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Longest room label that still fits one report cell.
pub const MAX_ROOM_LEN: usize = 16;

/// Number of rows a complete run writes for one day.
pub fn combination_count() -> usize {
    DEPARTMENTS.len() * YEARS.len() * SECTIONS.len()
}

/// Today's date in the server's local time zone.
pub fn today() -> String {
    chrono::Local::now().date_naive().format(DAY_FORMAT).to_string()
}

/// Checks a submitted day and returns it in canonical form.
pub fn parse_day(raw: &str) -> AppResult<String> {
    NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT)
        .map(|d| d.format(DAY_FORMAT).to_string())
        .map_err(|_| AppError::ValidationError(format!("invalid day '{}'", raw)))
}

/// Room labels are printable ASCII (the report's builtin fonts cover nothing
/// else) and at most `MAX_ROOM_LEN` characters.
pub fn parse_room(raw: &str) -> AppResult<String> {
    let room = raw.trim();
    if room.is_empty() {
        return Err(AppError::ValidationError("room is required".into()));
    }
    if !room.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        return Err(AppError::ValidationError(format!(
            "room '{}' may only contain printable ASCII characters",
            room
        )));
    }
    if room.len() > MAX_ROOM_LEN {
        return Err(AppError::ValidationError(format!(
            "room '{}' is longer than {} characters",
            room, MAX_ROOM_LEN
        )));
    }
    Ok(room.to_string())
}

// --- Engine ---

/// Assigns `rooms[i % rooms.len()]` to the i-th (department, year, section)
/// combination, walking departments, then years, then sections.
pub fn plan_allotment(rooms: &[String], day: &str) -> AppResult<Vec<Allotment>> {
    if rooms.is_empty() {
        return Err(AppError::EmptyRoomPool);
    }

    let mut plan = Vec::with_capacity(combination_count());
    for department in DEPARTMENTS {
        for year in YEARS {
            for section in SECTIONS {
                let room = &rooms[plan.len() % rooms.len()];
                plan.push(Allotment {
                    department: department.to_string(),
                    year: year.to_string(),
                    section: section.to_string(),
                    room: room.clone(),
                    day: day.to_string(),
                });
            }
        }
    }
    Ok(plan)
}

/// Replaces every allotment of `day` with a freshly shuffled assignment.
/// Delete and inserts share one transaction, so readers never observe a
/// partially written day.
pub async fn run_allotment(db_pool: &SqlitePool, day: &str) -> AppResult<usize> {
    let rooms = room_pool::shuffled_pool();
    run_allotment_with_pool(db_pool, day, &rooms).await
}

pub async fn run_allotment_with_pool(
    db_pool: &SqlitePool,
    day: &str,
    rooms: &[String],
) -> AppResult<usize> {
    tracing::info!("Running allotment for {} with {} rooms", day, rooms.len());

    // Refuse before touching storage
    let plan = plan_allotment(rooms, day)?;

    let mut tx = db_pool.begin().await?;

    let removed = delete_by_day(&mut *tx, day).await?;
    tracing::debug!("Removed {} previous allotments for {}", removed, day);

    for allotment in &plan {
        insert(&mut *tx, allotment).await?;
    }

    tx.commit().await?;
    tracing::info!("✅ {} allotments written for {}", plan.len(), day);
    Ok(plan.len())
}

// --- Store ---

pub async fn delete_by_day<'e, E>(executor: E, day: &str) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM allotments WHERE day = ?1")
        .bind(day)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert<'e, E>(executor: E, allotment: &Allotment) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO allotments (department, year, section, room, day)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&allotment.department)
    .bind(&allotment.year)
    .bind(&allotment.section)
    .bind(&allotment.room)
    .bind(&allotment.day)
    .execute(executor)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::warn!(
                "Duplicate allotment for {}/{}/{} on {}",
                allotment.department,
                allotment.year,
                allotment.section,
                allotment.day
            );
            Err(AppError::DuplicateAllotment {
                department: allotment.department.clone(),
                year: allotment.year.clone(),
                section: allotment.section.clone(),
                day: allotment.day.clone(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn query_by_day<'e, E>(executor: E, day: &str) -> AppResult<Vec<Allotment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, Allotment>(
        r#"
        SELECT department, year, section, room, day
        FROM allotments
        WHERE day = ?1
        ORDER BY id ASC
        "#,
    )
    .bind(day)
    .fetch_all(executor)
    .await?;
    tracing::debug!("{} allotments found for {}", rows.len(), day);
    Ok(rows)
}

/// All days for one department, newest day first.
pub async fn query_by_department<'e, E>(executor: E, department: &str) -> AppResult<Vec<Allotment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, Allotment>(
        r#"
        SELECT department, year, section, room, day
        FROM allotments
        WHERE department = ?1
        ORDER BY day DESC, id ASC
        "#,
    )
    .bind(department)
    .fetch_all(executor)
    .await?;
    tracing::debug!("{} allotments found for department {}", rows.len(), department);
    Ok(rows)
}

pub async fn query_all<'e, E>(executor: E) -> AppResult<Vec<Allotment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, Allotment>(
        r#"
        SELECT department, year, section, room, day
        FROM allotments
        ORDER BY day ASC, id ASC
        "#,
    )
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Manual override. Returns how many rows matched (0 or 1, the key is unique).
pub async fn update_room<'e, E>(
    executor: E,
    department: &str,
    year: &str,
    section: &str,
    day: &str,
    new_room: &str,
) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    tracing::info!(
        "Setting room {} for {}/{}/{} on {}",
        new_room,
        department,
        year,
        section,
        day
    );
    let result = sqlx::query(
        r#"
        UPDATE allotments
        SET room = ?1
        WHERE department = ?2 AND year = ?3 AND section = ?4 AND day = ?5
        "#,
    )
    .bind(new_room)
    .bind(department)
    .bind(year)
    .bind(section)
    .bind(day)
    .execute(executor)
    .await?;

    let rows_affected = result.rows_affected();
    if rows_affected == 0 {
        tracing::warn!(
            "No allotment matched {}/{}/{} on {}",
            department,
            year,
            section,
            day
        );
    }
    Ok(rows_affected)
}
