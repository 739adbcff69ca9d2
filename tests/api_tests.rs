// tests/api_tests.rs
//
// End-to-end flows against Postgres. Set DATABASE_URL to run them; without it
// each test returns early.

use std::net::SocketAddr;

use mcq_grader::{
    client::{AnswerKeyDraft, ApiClient, ClientError, RequestError, SessionStore},
    config::Config,
    models::{submission::StudentSheet, user::RegisterRequest},
    routes,
    state::AppState,
};
use sqlx::postgres::PgPoolOptions;

/// Spawns the app on a random port. Returns the base URL, or `None` when no
/// database is configured.
async fn spawn_app() -> Option<String> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cors_origins: Vec::new(),
    };

    let app = routes::create_router(AppState { pool, config });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some(address)
}

fn unique_email() -> String {
    format!("t_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

async fn registered_client(address: &str) -> ApiClient {
    let client = ApiClient::new(address, SessionStore::in_memory()).unwrap();
    let email = unique_email();
    client
        .register(&RegisterRequest {
            email: email.clone(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
        })
        .await
        .expect("Register failed");
    client
}

fn draft(code: &str, key: &str) -> AnswerKeyDraft {
    let mut draft = AnswerKeyDraft::new();
    draft
        .set_course_code(code)
        .set_course_name("Intro to CS")
        .set_num_questions(key.len() as i32)
        .set_answer_key(key);
    draft
}

#[tokio::test]
async fn register_then_login_again() {
    let Some(address) = spawn_app().await else { return };
    let client = ApiClient::new(&address, SessionStore::in_memory()).unwrap();
    let email = unique_email();

    let registration = RegisterRequest {
        email: email.clone(),
        password: "password123".to_string(),
        confirm_password: "password123".to_string(),
    };
    client.register(&registration).await.unwrap();

    let err = client.register(&registration).await.unwrap_err();
    match err {
        ClientError::Request(e) => assert_eq!(e.message(), "Email address already taken."),
        other => panic!("unexpected {other:?}"),
    }

    let session = client.login(&email.to_uppercase(), "password123").await.unwrap();
    assert_eq!(session.user, email);

    let err = client.login(&email, "nope").await.unwrap_err();
    assert!(matches!(err, ClientError::Request(RequestError::Status { status: 403, .. })));
}

#[tokio::test]
async fn answer_key_lifecycle() {
    let Some(address) = spawn_app().await else { return };
    let client = registered_client(&address).await;

    client.save_answer_key(&draft("CS101", "ABCDABCD")).await.unwrap();

    // one key per course code
    let err = client.save_answer_key(&draft("CS101", "AAAA")).await.unwrap_err();
    match err {
        ClientError::Request(RequestError::Status { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Answer key for CS101 already exists");
        }
        other => panic!("unexpected {other:?}"),
    }

    let keys = client.list_answer_keys().await.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].answer_key, "ABCDABCD");
    assert_eq!(keys[0].total_marks, 8);

    let mut edit = AnswerKeyDraft::from_view(&keys[0]);
    edit.set_mark_per_question(2).set_answer_key("dddd cccc");
    client.edit_answer_key(keys[0].id, &edit).await.unwrap();

    let keys = client.list_answer_keys().await.unwrap();
    assert_eq!(keys[0].answer_key, "DDDDCCCC");
    assert_eq!(keys[0].total_marks, 16);

    // renaming onto a code the caller already uses
    client.save_answer_key(&draft("CS102", "AB")).await.unwrap();
    let mut rename = AnswerKeyDraft::from_view(&keys[0]);
    rename.set_course_code("CS102");
    let err = client.edit_answer_key(keys[0].id, &rename).await.unwrap_err();
    match err {
        ClientError::Request(RequestError::Status { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Answer key for CS102 already exists");
        }
        other => panic!("unexpected {other:?}"),
    }
    let keys: Vec<_> = client
        .list_answer_keys()
        .await
        .unwrap()
        .into_iter()
        .filter(|k| k.course_code == "CS101")
        .collect();
    assert_eq!(keys.len(), 1);

    client.delete_answer_key(keys[0].id).await.unwrap();
    assert_eq!(client.list_answer_keys().await.unwrap().len(), 1);

    let err = client.delete_answer_key(keys[0].id).await.unwrap_err();
    assert!(matches!(err, ClientError::Request(RequestError::Status { status: 404, .. })));
}

#[tokio::test]
async fn keys_are_private_to_their_author() {
    let Some(address) = spawn_app().await else { return };
    let owner = registered_client(&address).await;
    let other = registered_client(&address).await;

    owner.save_answer_key(&draft("PHY110", "ABC")).await.unwrap();
    let key_id = owner.list_answer_keys().await.unwrap()[0].id;

    assert!(other.list_answer_keys().await.unwrap().is_empty());
    let err = other.delete_answer_key(key_id).await.unwrap_err();
    assert!(matches!(err, ClientError::Request(RequestError::Status { status: 404, .. })));

    let err = other
        .edit_answer_key(key_id, &draft("PHY110", "DDD"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Request(RequestError::Status { status: 404, .. })));

    let keys = owner.list_answer_keys().await.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].answer_key, "ABC");
}

#[tokio::test]
async fn grading_flow_produces_course_report() {
    let Some(address) = spawn_app().await else { return };
    let client = registered_client(&address).await;

    let mut key = draft("MTH201", "ABCD");
    key.set_negative_marking(true, 0.25);
    client.save_answer_key(&key).await.unwrap();

    let graded = client
        .save_student_answers(
            " MTH201 ",
            vec![
                StudentSheet {
                    student_id: 1001,
                    student_name: Some("Ada Lovelace".into()),
                    answers: "abcd".into(),
                },
                StudentSheet {
                    student_id: 1002,
                    student_name: Some("Alan Turing".into()),
                    answers: "BBCA".into(),
                },
            ],
        )
        .await
        .unwrap();
    assert_eq!(graded.graded.len(), 2);
    assert_eq!(graded.graded[0].grade, "A");
    assert_eq!(graded.graded[1].score, 1.75);

    let report = client.course_report(" MTH201").await.unwrap();
    assert_eq!(report.total_submissions, 2);
    assert_eq!(report.correct_answers, "ABCD");
    assert_eq!(report.highest_score, 4.0);
    assert_eq!(report.pass_rate, 50);

    let overview = client.list_courses().await.unwrap();
    assert_eq!(overview.total_courses, 1);
    assert_eq!(overview.total_submissions, 2);
    assert_eq!(overview.course_list[0].course_code, "MTH201");

    let err = client.course_report("NOPE").await.unwrap_err();
    assert!(matches!(err, ClientError::Request(RequestError::Status { status: 404, .. })));
}
