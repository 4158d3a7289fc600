// src/models/allotment.rs
use serde::Deserialize;
use sqlx::FromRow;

/// One room assigned to one (department, year, section) for one day.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Allotment {
    pub department: String,
    pub year: String,
    pub section: String,
    pub room: String,
    pub day: String, // YYYY-MM-DD
}

// Admin manual override, posted to /update
#[derive(Debug, Deserialize)]
pub struct UpdateRoomForm {
    #[serde(rename = "dept")]
    pub department: String,
    pub year: String,
    pub section: String,
    pub day: String,
    pub room: String,
}
