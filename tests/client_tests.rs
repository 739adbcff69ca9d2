// tests/client_tests.rs
//
// Drives `ApiClient` against a small in-process stub of the grading API.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use mcq_grader::{
    client::{AnswerKeyDraft, ApiClient, ClientError, RequestError, SessionStore},
    models::submission::StudentSheet,
    utils::filter::filter_by_term,
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Stub {
    saves: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
    last_auth: Arc<Mutex<Option<String>>>,
    last_query: Arc<Mutex<Option<String>>>,
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "password123" {
        (
            StatusCode::CREATED,
            Json(json!({ "user": body["email"], "token": "stub-token" })),
        )
    } else {
        (StatusCode::FORBIDDEN, Json(json!({ "message": "Invalid credentials" })))
    }
}

async fn save(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    stub.saves.fetch_add(1, Ordering::SeqCst);
    *stub.last_auth.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let conflict = body["courseCode"] == "DUP1";
    *stub.last_body.lock().unwrap() = Some(body);

    if conflict {
        (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Answer key for DUP1 already exists", "message": "Answer key for DUP1 already exists" })),
        )
    } else {
        (StatusCode::CREATED, Json(json!({ "id": 1, "message": "Saved successfully" })))
    }
}

async fn keys(
    State(stub): State<Stub>,
    Path(email): Path<String>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    *stub.last_query.lock().unwrap() = query;
    Json(json!([
        {
            "id": 1,
            "courseCode": "CS101",
            "courseName": "Intro to Computing",
            "numQuestions": 4,
            "markPerQuestion": 1,
            "totalMarks": 4,
            "answerKey": "ABCD",
            "gradingScale": "STD",
            "negativeMarking": false,
            "negativePoints": 0.0,
            "dateAdded": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        },
        {
            "id": 2,
            "courseCode": "MTH201",
            "courseName": format!("Algebra for {email}"),
            "numQuestions": 2,
            "markPerQuestion": 2,
            "totalMarks": 4,
            "answerKey": "DA",
            "gradingScale": "NUM",
            "negativeMarking": true,
            "negativePoints": 0.5,
            "dateAdded": "2025-01-02T00:00:00Z",
            "updatedAt": "2025-01-02T00:00:00Z"
        }
    ]))
}

async fn broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "plain text failure")
}

async fn spawn_stub() -> (String, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/api/user/login", post(login))
        .route("/api/user/save", post(save))
        .route("/api/user/keys/{email}", get(keys))
        .route("/api/user/courses", get(broken))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, stub)
}

fn filled_draft(code: &str) -> AnswerKeyDraft {
    let mut draft = AnswerKeyDraft::new();
    draft
        .set_course_code(code)
        .set_course_name("Intro to Computing")
        .set_num_questions(4)
        .set_mark_per_question(2)
        .set_answer_key("a, b, c, d");
    draft
}

#[tokio::test]
async fn login_stores_session_and_save_sends_clean_payload() {
    let (address, stub) = spawn_stub().await;
    let client = ApiClient::new(&address, SessionStore::in_memory()).unwrap();

    let session = client.login("teacher@example.com", "password123").await.unwrap();
    assert_eq!(session.token, "stub-token");
    assert_eq!(client.sessions().current(), Some(session));

    let message = client.save_answer_key(&filled_draft("CS101")).await.unwrap();
    assert_eq!(message, "Saved successfully");

    let body = stub.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["answerKey"], "ABCD");
    assert_eq!(body["totalMarks"], 8);
    assert_eq!(body["author"], "teacher@example.com");
    assert_eq!(stub.last_auth.lock().unwrap().as_deref(), Some("Bearer stub-token"));
}

#[tokio::test]
async fn invalid_draft_never_reaches_the_server() {
    let (address, stub) = spawn_stub().await;
    let client = ApiClient::new(&address, SessionStore::in_memory()).unwrap();
    client.login("teacher@example.com", "password123").await.unwrap();

    let mut draft = filled_draft("CS101");
    draft.set_answer_key("ABCX123");

    let err = client.save_answer_key(&draft).await.unwrap_err();
    match err {
        ClientError::Validation(e) => assert!(e.message.contains("exactly 4 answers")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(stub.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_message_is_surfaced() {
    let (address, _stub) = spawn_stub().await;
    let client = ApiClient::new(&address, SessionStore::in_memory()).unwrap();

    let err = client.login("teacher@example.com", "wrong").await.unwrap_err();
    match err {
        ClientError::Request(e) => {
            assert_eq!(e.status(), Some(403));
            assert_eq!(e.message(), "Invalid credentials");
        }
        other => panic!("expected request error, got {other:?}"),
    }
    assert_eq!(client.sessions().current(), None);

    client.login("teacher@example.com", "password123").await.unwrap();
    let err = client.save_answer_key(&filled_draft("DUP1")).await.unwrap_err();
    match err {
        ClientError::Request(RequestError::Status { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Answer key for DUP1 already exists");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_failure_uses_fallback_message() {
    let (address, _stub) = spawn_stub().await;
    let client = ApiClient::new(&address, SessionStore::in_memory()).unwrap();
    client.login("teacher@example.com", "password123").await.unwrap();

    let err = client.list_courses().await.unwrap_err();
    match err {
        ClientError::Request(e) => {
            assert_eq!(e.status(), Some(500));
            assert_eq!(e.message(), "Unexpected error");
        }
        other => panic!("expected request error, got {other:?}"),
    }
}

#[tokio::test]
async fn listed_keys_can_be_filtered_and_edited_locally() {
    let (address, stub) = spawn_stub().await;
    let client = ApiClient::new(&address, SessionStore::in_memory()).unwrap();
    client.login("teacher@example.com", "password123").await.unwrap();

    let keys = client.list_answer_keys().await.unwrap();
    assert_eq!(keys.len(), 2);
    // identity travels in the bearer token only
    assert_eq!(*stub.last_query.lock().unwrap(), None);
    assert!(keys[1].course_name.contains("teacher@example.com"));

    assert_eq!(filter_by_term(&keys, "").len(), 2);
    let hits = filter_by_term(&keys, "mth");
    assert_eq!(hits.len(), 1);

    let mut draft = AnswerKeyDraft::from_view(hits[0]);
    assert_eq!(draft.total_marks(), 4);
    draft.set_mark_per_question(3);
    assert_eq!(draft.total_marks(), 6);
}

#[tokio::test]
async fn session_file_is_shared_across_clients_and_cleared_on_logout() {
    let (address, _stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let client = ApiClient::new(&address, SessionStore::at(&path)).unwrap();
    client.login("teacher@example.com", "password123").await.unwrap();

    let restored = SessionStore::at(&path);
    restored.load().unwrap();
    let second = ApiClient::new(&address, restored).unwrap();
    assert_eq!(second.list_answer_keys().await.unwrap().len(), 2);

    second.logout().unwrap();
    assert!(!path.exists());
    let err = second.list_answer_keys().await.unwrap_err();
    assert!(matches!(err, ClientError::Request(RequestError::NotSignedIn)));
}

#[tokio::test]
async fn grading_batch_requires_session() {
    let client = ApiClient::new("http://127.0.0.1:9", SessionStore::in_memory()).unwrap();
    let sheets = vec![StudentSheet {
        student_id: 1,
        student_name: Some("Ada".into()),
        answers: "ABCD".into(),
    }];
    let err = client.save_student_answers("CS101", sheets).await.unwrap_err();
    assert!(matches!(err, ClientError::Request(RequestError::NotSignedIn)));
}
