// src/models/answer_key.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    error::ValidationError,
    utils::{
        answer_key::{clean_answer_key, total_marks, validate_num_questions},
        filter::Searchable,
    },
};

/// Report formatting hint. Does not affect scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradingScale {
    #[default]
    #[serde(rename = "STD")]
    Standard,
    #[serde(rename = "NUM")]
    Numeric,
    #[serde(rename = "CUS")]
    Custom,
}

impl GradingScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradingScale::Standard => "STD",
            GradingScale::Numeric => "NUM",
            GradingScale::Custom => "CUS",
        }
    }
}

impl fmt::Display for GradingScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradingScale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STD" => Ok(GradingScale::Standard),
            "NUM" => Ok(GradingScale::Numeric),
            "CUS" => Ok(GradingScale::Custom),
            other => Err(ValidationError::new(
                "gradingScale",
                format!("Unknown grading scale '{other}'"),
            )),
        }
    }
}

/// Represents the 'answer_keys' table in the database.
/// Negative-marking settings live on the same row.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerKey {
    pub id: i64,
    pub author_id: i64,
    pub course_code: String,
    pub course_name: String,
    pub num_questions: i32,
    pub mark_per_question: i32,
    pub total_marks: i32,
    pub answer_key: String,
    pub grading_scale: String,
    pub negative_marking: bool,
    pub negative_points: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

fn default_mark_per_question() -> i32 {
    1
}

fn default_negative_points() -> f64 {
    0.25
}

/// Request body shared by the create and edit forms.
///
/// `totalMarks` is accepted for compatibility but never trusted.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerKeyPayload {
    #[validate(length(min = 1, max = 10, message = "Course code is required (max 10 characters)"))]
    pub course_code: String,
    #[validate(length(min = 1, max = 50, message = "Course name is required (max 50 characters)"))]
    pub course_name: String,
    pub num_questions: i32,
    #[serde(default = "default_mark_per_question")]
    #[validate(range(min = 1, message = "Mark per question must be at least 1"))]
    pub mark_per_question: i32,
    pub answer_key: String,
    #[serde(default)]
    pub negative_marking: bool,
    /// Only checked and stored when `negative_marking` is on.
    #[serde(default = "default_negative_points")]
    pub negative_points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<i32>,
    #[serde(default)]
    pub grading_scale: GradingScale,
    /// Legacy identity field; checked against the bearer token when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// DTO for `PATCH /edit`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct EditAnswerKeyRequest {
    pub id: i64,
    #[serde(flatten)]
    #[validate(nested)]
    pub payload: AnswerKeyPayload,
}

/// DTO for `POST /delete`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteAnswerKeyRequest {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A validated answer key: normalized letters and a recomputed total.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerKeySpec {
    pub course_code: String,
    pub course_name: String,
    pub num_questions: i32,
    pub mark_per_question: i32,
    pub answer_key: String,
    pub negative_marking: bool,
    pub negative_points: f64,
    pub total_marks: i32,
    pub grading_scale: GradingScale,
}

impl TryFrom<&AnswerKeyPayload> for AnswerKeySpec {
    type Error = ValidationError;

    fn try_from(payload: &AnswerKeyPayload) -> Result<Self, Self::Error> {
        let course_code = payload.course_code.trim().to_string();
        let course_name = payload.course_name.trim().to_string();
        if course_code.is_empty() {
            return Err(ValidationError::new("courseCode", "Course code is required"));
        }
        if course_name.is_empty() {
            return Err(ValidationError::new("courseName", "Course name is required"));
        }
        validate_num_questions(payload.num_questions)?;
        payload.validate().map_err(first_validation_error)?;

        let negative_points = if payload.negative_marking {
            validate_negative_points(payload.negative_points)?;
            payload.negative_points
        } else {
            0.0
        };

        let answer_key = clean_answer_key(&payload.answer_key, payload.num_questions)?;

        Ok(Self {
            course_code,
            course_name,
            num_questions: payload.num_questions,
            mark_per_question: payload.mark_per_question,
            answer_key,
            negative_marking: payload.negative_marking,
            negative_points,
            total_marks: total_marks(payload.num_questions, payload.mark_per_question),
            grading_scale: payload.grading_scale,
        })
    }
}

fn validate_negative_points(points: f64) -> Result<(), ValidationError> {
    if (0.0..=10.0).contains(&points) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "negativePoints",
            "Negative points must be between 0 and 10",
        ))
    }
}

/// Collapses derive errors to the first field message, in field-name order.
pub fn first_validation_error(errors: validator::ValidationErrors) -> ValidationError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"));
                ValidationError::new(field_name(&field), message)
            })
        })
        .unwrap_or_else(|| ValidationError::new("form", errors.to_string()))
}

fn field_name(field: &str) -> &'static str {
    match field {
        "course_code" => "courseCode",
        "course_name" => "courseName",
        "mark_per_question" => "markPerQuestion",
        _ => "form",
    }
}

/// Answer key as listed to its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerKeyView {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub num_questions: i32,
    pub mark_per_question: i32,
    pub total_marks: i32,
    pub answer_key: String,
    pub grading_scale: GradingScale,
    pub negative_marking: bool,
    pub negative_points: f64,
    pub date_added: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<AnswerKey> for AnswerKeyView {
    fn from(row: AnswerKey) -> Self {
        Self {
            id: row.id,
            grading_scale: row.grading_scale.parse().unwrap_or_default(),
            course_code: row.course_code,
            course_name: row.course_name,
            num_questions: row.num_questions,
            mark_per_question: row.mark_per_question,
            total_marks: row.total_marks,
            answer_key: row.answer_key,
            negative_marking: row.negative_marking,
            negative_points: row.negative_points,
            date_added: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Searchable for AnswerKeyView {
    fn search_fields(&self) -> Vec<String> {
        vec![self.course_code.clone(), self.course_name.clone()]
    }
}
