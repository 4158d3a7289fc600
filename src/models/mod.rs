// src/models/mod.rs
pub mod allotment;
pub mod user;
