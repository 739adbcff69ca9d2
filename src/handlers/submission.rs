// src/handlers/submission.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::answer_key::find_by_course,
    models::submission::{GradedStudent, SaveAnswersRequest, SaveAnswersResponse},
    utils::{
        grading::{MarkingScheme, grade_sheet},
        jwt::Claims,
    },
};

/// Grades a batch of student sheets against the course's answer key and
/// stores them. The batch is written in one transaction.
pub async fn save_answers(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SaveAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let key = find_by_course(&pool, claims.user_id()?, &req.course_code).await?;
    let scheme = MarkingScheme {
        mark_per_question: key.mark_per_question,
        total_marks: key.total_marks,
        negative_marking: key.negative_marking,
        negative_points: key.negative_points,
    };

    let mut tx = pool.begin().await?;
    let mut graded = Vec::with_capacity(req.students.len());

    for student in &req.students {
        let sheet = grade_sheet(&key.answer_key, &student.answers, &scheme);

        sqlx::query(
            r#"
            INSERT INTO submissions (answer_key_id, student_id, student_name, answers, score, percentage, grade)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(key.id)
        .bind(student.student_id)
        .bind(student.student_name.as_deref())
        .bind(&sheet.answers)
        .bind(sheet.score)
        .bind(sheet.percentage)
        .bind(sheet.grade)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store submission for {}: {:?}", student.student_id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        graded.push(GradedStudent {
            student_id: student.student_id,
            score: sheet.score,
            percentage: sheet.percentage,
            grade: sheet.grade.to_string(),
        });
    }

    tx.commit().await?;

    tracing::info!(
        course_code = %key.course_code,
        count = graded.len(),
        "Graded student submissions"
    );

    Ok((
        StatusCode::CREATED,
        Json(SaveAnswersResponse {
            message: "Saved successfully".to_string(),
            graded,
        }),
    ))
}
