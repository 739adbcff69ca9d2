// src/handlers/answer_key.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::{AppError, is_unique_violation},
    models::answer_key::{
        AnswerKey, AnswerKeyPayload, AnswerKeySpec, AnswerKeyView, DeleteAnswerKeyRequest,
        EditAnswerKeyRequest,
    },
    utils::{filter::filter_by_term, jwt::Claims},
};

const ANSWER_KEY_COLUMNS: &str = "id, author_id, course_code, course_name, num_questions, \
     mark_per_question, total_marks, answer_key, grading_scale, negative_marking, \
     negative_points, created_at, updated_at";

/// Optional search term for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Creates an answer key for one of the caller's courses.
///
/// * The key is normalized and length-checked; `totalMarks` is recomputed.
/// * A second key for the same course code is a 409.
pub async fn save_answer_key(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AnswerKeyPayload>,
) -> Result<impl IntoResponse, AppError> {
    claims.ensure_author(payload.author.as_deref())?;
    let spec = AnswerKeySpec::try_from(&payload)?;
    let author_id = claims.user_id()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO answer_keys (
            author_id, course_code, course_name, num_questions, mark_per_question,
            total_marks, answer_key, grading_scale, negative_marking, negative_points
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(&spec.course_code)
    .bind(&spec.course_name)
    .bind(spec.num_questions)
    .bind(spec.mark_per_question)
    .bind(spec.total_marks)
    .bind(&spec.answer_key)
    .bind(spec.grading_scale.as_str())
    .bind(spec.negative_marking)
    .bind(spec.negative_points)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Answer key for {} already exists", spec.course_code))
        } else {
            tracing::error!("Failed to save answer key: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(answer_key_id = id, course_code = %spec.course_code, "Answer key saved");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Saved successfully" })),
    ))
}

/// Updates one of the caller's answer keys in place.
pub async fn edit_answer_key(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<EditAnswerKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    claims.ensure_author(req.payload.author.as_deref())?;
    let spec = AnswerKeySpec::try_from(&req.payload)?;
    let author_id = claims.user_id()?;

    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE answer_keys SET
            course_code = $1,
            course_name = $2,
            num_questions = $3,
            mark_per_question = $4,
            total_marks = $5,
            answer_key = $6,
            grading_scale = $7,
            negative_marking = $8,
            negative_points = $9,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $10 AND author_id = $11
        RETURNING id
        "#,
    )
    .bind(&spec.course_code)
    .bind(&spec.course_name)
    .bind(spec.num_questions)
    .bind(spec.mark_per_question)
    .bind(spec.total_marks)
    .bind(&spec.answer_key)
    .bind(spec.grading_scale.as_str())
    .bind(spec.negative_marking)
    .bind(spec.negative_points)
    .bind(req.id)
    .bind(author_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Answer key for {} already exists", spec.course_code))
        } else {
            tracing::error!("Failed to update answer key {}: {:?}", req.id, e);
            AppError::from(e)
        }
    })?;

    updated.ok_or_else(|| AppError::NotFound("Answer key not found".to_string()))?;

    Ok(Json(json!({ "message": "Answer Key Updated" })))
}

/// Deletes one of the caller's answer keys together with its submissions.
pub async fn delete_answer_key(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DeleteAnswerKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    claims.ensure_author(req.author.as_deref())?;

    let result = sqlx::query("DELETE FROM answer_keys WHERE id = $1 AND author_id = $2")
        .bind(req.id)
        .bind(claims.user_id()?)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Answer key not found".to_string()));
    }

    tracing::info!(answer_key_id = req.id, "Answer key deleted");

    Ok(Json(json!({ "message": "Answer Key Deleted" })))
}

/// Lists the caller's answer keys, newest first.
///
/// The path email must be the caller's own. `?q=` narrows by code or name.
pub async fn list_answer_keys(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(email): Path<String>,
    Query(search): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    claims.ensure_author(Some(&email))?;

    let rows = sqlx::query_as::<_, AnswerKey>(&format!(
        "SELECT {ANSWER_KEY_COLUMNS} FROM answer_keys WHERE author_id = $1 ORDER BY created_at DESC"
    ))
    .bind(claims.user_id()?)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list answer keys: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let keys: Vec<AnswerKeyView> = rows.into_iter().map(AnswerKeyView::from).collect();
    let keys: Vec<AnswerKeyView> = filter_by_term(&keys, search.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(keys))
}

/// Loads one of the caller's answer keys by course code.
pub(crate) async fn find_by_course(
    pool: &PgPool,
    author_id: i64,
    course_code: &str,
) -> Result<AnswerKey, AppError> {
    // keys are stored with a trimmed code
    let course_code = course_code.trim();
    sqlx::query_as::<_, AnswerKey>(&format!(
        "SELECT {ANSWER_KEY_COLUMNS} FROM answer_keys WHERE author_id = $1 AND course_code = $2"
    ))
    .bind(author_id)
    .bind(course_code)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No answer key for course {course_code}")))
}
