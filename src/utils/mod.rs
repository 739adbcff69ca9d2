// src/utils/mod.rs

pub mod answer_key;
pub mod filter;
pub mod grading;
pub mod hash;
pub mod jwt;
