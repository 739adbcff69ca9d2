// src/models/submission.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::filter::Searchable;

/// Represents the 'submissions' table: one graded answer sheet.
#[derive(Debug, Clone, FromRow)]
pub struct Submission {
    pub id: i64,
    pub answer_key_id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub answers: String,
    pub score: f64,
    pub percentage: f64,
    pub grade: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One student's sheet as read from a scan or typed in manually.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentSheet {
    pub student_id: i64,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub student_name: Option<String>,
    #[validate(length(min = 1, message = "Answers are required"))]
    pub answers: String,
}

/// DTO for `POST /save-answers`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswersRequest {
    #[serde(alias = "course_code")]
    #[validate(length(min = 1, max = 10))]
    pub course_code: String,
    #[validate(length(min = 1, message = "Add at least one student"))]
    #[validate(nested)]
    pub students: Vec<StudentSheet>,
}

/// Per-student outcome of a grading batch.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedStudent {
    pub student_id: i64,
    pub score: f64,
    pub percentage: f64,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SaveAnswersResponse {
    pub message: String,
    pub graded: Vec<GradedStudent>,
}

/// A submission inside a course report.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub score: f64,
    pub percentage: f64,
    pub grade: String,
    /// One letter per question.
    pub answers: Vec<String>,
    pub time_processed: chrono::DateTime<chrono::Utc>,
}

impl From<Submission> for SubmissionView {
    fn from(row: Submission) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            student_name: row.student_name.unwrap_or_default(),
            score: row.score,
            percentage: row.percentage,
            grade: row.grade,
            answers: row.answers.chars().map(String::from).collect(),
            time_processed: row.created_at,
        }
    }
}

impl Searchable for SubmissionView {
    fn search_fields(&self) -> Vec<String> {
        vec![self.student_name.clone(), self.student_id.to_string()]
    }
}
