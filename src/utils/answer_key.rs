// src/utils/answer_key.rs

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::error::ValidationError;

/// Allowed answer letters, in option order.
pub const OPTIONS: [char; 4] = ['A', 'B', 'C', 'D'];

pub const MIN_QUESTIONS: i32 = 1;
pub const MAX_QUESTIONS: i32 = 200;

/// Anything that is not an answer letter, spaces included.
static NON_ANSWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^ABCD]").expect("answer filter regex is valid"));

/// Strips every character outside {A,B,C,D} (case-insensitive) and uppercases the rest.
///
/// Invalid characters are removed, never rejected; the length check runs on
/// the result.
pub fn normalize(raw: &str) -> String {
    NON_ANSWER.replace_all(raw, "").to_uppercase()
}

/// Fails unless the normalized key holds exactly `num_questions` answers.
pub fn validate_length(normalized: &str, num_questions: i32) -> Result<(), ValidationError> {
    let len = normalized.chars().count();
    if usize::try_from(num_questions).is_ok_and(|n| n == len) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "answerKey",
            format!("Answer key must contain exactly {num_questions} answers (A, B, C, or D)."),
        ))
    }
}

/// Normalizes `raw` and checks its length in one step.
pub fn clean_answer_key(raw: &str, num_questions: i32) -> Result<String, ValidationError> {
    let cleaned = normalize(raw);
    validate_length(&cleaned, num_questions)?;
    Ok(cleaned)
}

/// Live "current/total" counter shown while the key is typed.
pub fn key_progress(raw: &str, num_questions: i32) -> (usize, i32) {
    (normalize(raw).chars().count(), num_questions)
}

/// Derived total; never authored directly.
pub fn total_marks(num_questions: i32, mark_per_question: i32) -> i32 {
    num_questions.saturating_mul(mark_per_question)
}

/// Uniformly random key of `num_questions` letters, for quick test data.
pub fn random_key(num_questions: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..num_questions)
        .map(|_| OPTIONS[rng.gen_range(0..OPTIONS.len())])
        .collect()
}

pub fn validate_num_questions(num_questions: i32) -> Result<(), ValidationError> {
    if (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&num_questions) {
        Ok(())
    } else if num_questions < MIN_QUESTIONS {
        Err(ValidationError::new("numQuestions", "Must be at least 1"))
    } else {
        Err(ValidationError::new("numQuestions", "Max 200 questions"))
    }
}
