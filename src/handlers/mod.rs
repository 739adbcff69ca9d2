// src/handlers/mod.rs

pub mod answer_key;
pub mod auth;
pub mod course;
pub mod submission;
