// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    models::{
        answer_key::AnswerKey,
        submission::{Submission, SubmissionView},
    },
    utils::{filter::Searchable, grading::PASS_PERCENTAGE},
};

/// Aggregate row for one of the author's courses.
#[derive(Debug, Clone, FromRow)]
pub struct CourseStatsRow {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub total_submissions: i64,
    pub average_percentage: Option<f64>,
    pub last_activity: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub total_submissions: i64,
    pub last_activity: Option<chrono::DateTime<chrono::Utc>>,
    /// Mean percentage, two decimals.
    pub average_score: String,
}

impl Searchable for CourseSummary {
    fn search_fields(&self) -> Vec<String> {
        vec![self.course_code.clone(), self.course_name.clone()]
    }
}

/// Body of `GET /courses`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesOverview {
    pub total_submissions: i64,
    pub total_courses: i64,
    pub overall_average: String,
    pub course_list: Vec<CourseSummary>,
}

impl CoursesOverview {
    /// The overall average weights each course by its submission count.
    pub fn from_rows(rows: Vec<CourseStatsRow>) -> Self {
        let total_submissions: i64 = rows.iter().map(|r| r.total_submissions).sum();
        let weighted: f64 = rows
            .iter()
            .map(|r| r.average_percentage.unwrap_or(0.0) * r.total_submissions as f64)
            .sum();
        let overall = if total_submissions == 0 {
            0.0
        } else {
            weighted / total_submissions as f64
        };

        let course_list: Vec<CourseSummary> = rows
            .into_iter()
            .map(|r| CourseSummary {
                id: r.id,
                course_code: r.course_code,
                course_name: r.course_name,
                total_submissions: r.total_submissions,
                last_activity: r.last_activity,
                average_score: format!("{:.2}", r.average_percentage.unwrap_or(0.0)),
            })
            .collect();

        Self {
            total_submissions,
            total_courses: course_list.len() as i64,
            overall_average: format!("{overall:.2}"),
            course_list,
        }
    }
}

/// Body of `GET /course/{course_code}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseReport {
    pub course_code: String,
    pub course_name: String,
    pub num_of_questions: i32,
    pub correct_answers: String,
    pub total_submissions: i64,
    /// Mean percentage, two decimals.
    pub average_score: String,
    pub highest_score: f64,
    /// Whole-number share of sheets at or above the pass mark.
    pub pass_rate: i64,
    pub submissions: Vec<SubmissionView>,
}

impl CourseReport {
    pub fn build(key: AnswerKey, submissions: Vec<Submission>) -> Self {
        let count = submissions.len();
        let (sum, highest, passed) = submissions.iter().fold(
            (0.0_f64, 0.0_f64, 0_usize),
            |(sum, highest, passed), s| {
                (
                    sum + s.percentage,
                    highest.max(s.score),
                    passed + usize::from(s.percentage >= PASS_PERCENTAGE),
                )
            },
        );
        let (average, pass_rate) = if count == 0 {
            (0.0, 0)
        } else {
            (
                sum / count as f64,
                ((passed as f64 / count as f64) * 100.0).round() as i64,
            )
        };

        Self {
            course_code: key.course_code,
            course_name: key.course_name,
            num_of_questions: key.num_questions,
            correct_answers: key.answer_key,
            total_submissions: count as i64,
            average_score: format!("{average:.2}"),
            highest_score: highest,
            pass_rate,
            submissions: submissions.into_iter().map(SubmissionView::from).collect(),
        }
    }
}
