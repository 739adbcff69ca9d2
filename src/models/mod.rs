// src/models/mod.rs

pub mod answer_key;
pub mod course;
pub mod submission;
pub mod user;
