// src/utils/grading.rs

use crate::utils::answer_key::OPTIONS;

/// Stored in place of a skipped or unreadable answer.
pub const UNANSWERED: char = '-';

/// Percentage at or above which a sheet counts as a pass.
pub const PASS_PERCENTAGE: f64 = 60.0;

/// Marking rules of one answer key.
#[derive(Debug, Clone, Copy)]
pub struct MarkingScheme {
    pub mark_per_question: i32,
    pub total_marks: i32,
    pub negative_marking: bool,
    pub negative_points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradedSheet {
    /// One character per answered position, `-` where the slot was blank.
    pub answers: String,
    pub score: f64,
    pub percentage: f64,
    pub grade: &'static str,
}

/// Splits a sheet into one slot per question.
///
/// Comma-separated input keeps empty slots (`A,,C`). Without commas the sheet
/// is split on whitespace, or per character when it has none. A slot that is
/// not a single A-D letter is unanswered.
pub fn sheet_slots(raw: &str) -> Vec<Option<char>> {
    let tokens: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else if raw.trim().contains(char::is_whitespace) {
        raw.split_whitespace().collect()
    } else {
        return raw.trim().chars().map(slot_letter).collect();
    };

    tokens
        .into_iter()
        .map(|token| {
            let mut chars = token.trim().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => slot_letter(c),
                _ => None,
            }
        })
        .collect()
}

fn slot_letter(c: char) -> Option<char> {
    let upper = c.to_ascii_uppercase();
    OPTIONS.contains(&upper).then_some(upper)
}

/// Scores one student sheet against the key, position by position.
///
/// Blank slots and positions past the end of the sheet are unanswered: no
/// credit and no deduction. A deduction only applies while the running score
/// exceeds it.
pub fn grade_sheet(key: &str, raw_answers: &str, scheme: &MarkingScheme) -> GradedSheet {
    let slots = sheet_slots(raw_answers);
    let mut score = 0.0_f64;

    for (expected, slot) in key.chars().zip(&slots) {
        let Some(answer) = slot else {
            continue;
        };
        if answer.eq_ignore_ascii_case(&expected) {
            score += f64::from(scheme.mark_per_question);
        } else if scheme.negative_marking && score > scheme.negative_points {
            score -= scheme.negative_points;
        }
    }

    let answers = slots
        .iter()
        .take(key.chars().count())
        .map(|slot| slot.unwrap_or(UNANSWERED))
        .collect();

    let percentage = if scheme.total_marks <= 0 {
        0.0
    } else {
        round2(score / f64::from(scheme.total_marks) * 100.0)
    };

    GradedSheet {
        answers,
        score: round2(score),
        percentage,
        grade: letter_grade(percentage),
    }
}

pub fn letter_grade(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => "A",
        p if p >= 80.0 => "B",
        p if p >= 70.0 => "C",
        p if p >= 60.0 => "D",
        p if p >= 50.0 => "E",
        _ => "F",
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
