// src/services/mod.rs
pub mod allotment_service;
pub mod auth_service;
pub mod report_service;
pub mod room_pool;
pub mod user_service;
