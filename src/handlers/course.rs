// src/handlers/course.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::answer_key::{SearchQuery, find_by_course},
    models::{
        course::{CourseReport, CourseStatsRow, CoursesOverview},
        submission::Submission,
    },
    utils::{filter::filter_by_term, jwt::Claims},
};

/// Course list with aggregate submission stats for the caller.
pub async fn list_courses(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(search): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, CourseStatsRow>(
        r#"
        SELECT
            k.id,
            k.course_code,
            k.course_name,
            COUNT(s.id) AS total_submissions,
            AVG(s.percentage) AS average_percentage,
            MAX(s.created_at) AS last_activity
        FROM answer_keys k
        LEFT JOIN submissions s ON s.answer_key_id = k.id
        WHERE k.author_id = $1
        GROUP BY k.id
        ORDER BY k.course_code
        "#,
    )
    .bind(claims.user_id()?)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to aggregate courses: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let mut overview = CoursesOverview::from_rows(rows);
    if let Some(term) = search.q.as_deref() {
        overview.course_list = filter_by_term(&overview.course_list, term)
            .into_iter()
            .cloned()
            .collect();
    }

    Ok(Json(overview))
}

/// Submission report for one course, newest sheets first.
pub async fn course_report(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = find_by_course(&pool, claims.user_id()?, &course_code).await?;

    let submissions = sqlx::query_as::<_, Submission>(
        r#"
        SELECT id, answer_key_id, student_id, student_name, answers, score, percentage, grade, created_at
        FROM submissions
        WHERE answer_key_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(key.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(CourseReport::build(key, submissions)))
}
