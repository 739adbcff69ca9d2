// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{answer_key, auth, course, submission},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the application router.
///
/// * Everything lives under `/api/user`.
/// * Login and register are public; the rest requires a bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));

    let protected_routes = Router::new()
        .route("/save", post(answer_key::save_answer_key))
        .route("/edit", patch(answer_key::edit_answer_key))
        .route("/delete", post(answer_key::delete_answer_key))
        .route("/keys/{email}", get(answer_key::list_answer_keys))
        .route("/courses", get(course::list_courses))
        .route("/course/{course_code}", get(course::course_report))
        .route("/save-answers", post(submission::save_answers))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/user", public_routes.merge(protected_routes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
