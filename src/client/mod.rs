// src/client/mod.rs

//! Typed HTTP client for the grading API, used by dashboards and scripts.
//!
//! Each call is a single best-effort request: no retries, no de-duplication,
//! no cancellation. A failure leaves local state untouched.

pub mod draft;
pub mod error;
pub mod session;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::models::{
    answer_key::{AnswerKeyView, DeleteAnswerKeyRequest, EditAnswerKeyRequest},
    course::{CourseReport, CoursesOverview},
    submission::{SaveAnswersRequest, SaveAnswersResponse, StudentSheet},
    user::{AuthResponse, LoginRequest, RegisterRequest},
};

pub use draft::AnswerKeyDraft;
pub use error::{ClientError, RequestError};
pub use session::{Session, SessionStore};

const FALLBACK_MESSAGE: &str = "Unexpected error";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    sessions: SessionStore,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str, sessions: SessionStore) -> Result<Self, RequestError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(RequestError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            sessions,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: AuthResponse = self.send_public(Method::POST, &["login"], &body).await?;
        self.remember(resp.into())
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<Session, ClientError> {
        let resp: AuthResponse = self.send_public(Method::POST, &["register"], req).await?;
        self.remember(resp.into())
    }

    /// Drops the local session. The server keeps no session state.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.sessions.clear().map_err(session_io)?;
        Ok(())
    }

    /// Validates the draft, then creates the answer key.
    pub async fn save_answer_key(&self, draft: &AnswerKeyDraft) -> Result<String, ClientError> {
        let session = self.session()?;
        let mut payload = draft.submit()?;
        payload.author = Some(session.user.clone());

        let resp: Value = self.send(&session, Method::POST, &["save"], &payload).await?;
        Ok(message_of(&resp))
    }

    /// Validates the draft, then overwrites answer key `id`.
    pub async fn edit_answer_key(&self, id: i64, draft: &AnswerKeyDraft) -> Result<String, ClientError> {
        let session = self.session()?;
        let mut payload = draft.submit()?;
        payload.author = Some(session.user.clone());

        let body = EditAnswerKeyRequest { id, payload };
        let resp: Value = self.send(&session, Method::PATCH, &["edit"], &body).await?;
        Ok(message_of(&resp))
    }

    pub async fn delete_answer_key(&self, id: i64) -> Result<String, ClientError> {
        let session = self.session()?;
        let body = DeleteAnswerKeyRequest {
            id,
            author: Some(session.user.clone()),
        };
        let resp: Value = self.send(&session, Method::POST, &["delete"], &body).await?;
        Ok(message_of(&resp))
    }

    pub async fn list_answer_keys(&self) -> Result<Vec<AnswerKeyView>, ClientError> {
        let session = self.session()?;
        let user = session.user.clone();
        self.fetch(&session, &["keys", user.as_str()]).await
    }

    pub async fn list_courses(&self) -> Result<CoursesOverview, ClientError> {
        let session = self.session()?;
        self.fetch(&session, &["courses"]).await
    }

    pub async fn course_report(&self, course_code: &str) -> Result<CourseReport, ClientError> {
        let session = self.session()?;
        self.fetch(&session, &["course", course_code]).await
    }

    pub async fn save_student_answers(
        &self,
        course_code: &str,
        students: Vec<StudentSheet>,
    ) -> Result<SaveAnswersResponse, ClientError> {
        let session = self.session()?;
        let body = SaveAnswersRequest {
            course_code: course_code.to_string(),
            students,
        };
        self.send(&session, Method::POST, &["save-answers"], &body).await
    }

    fn session(&self) -> Result<Session, ClientError> {
        self.sessions
            .current()
            .ok_or(ClientError::Request(RequestError::NotSignedIn))
    }

    fn remember(&self, session: Session) -> Result<Session, ClientError> {
        self.sessions.save(&session).map_err(session_io)?;
        Ok(session)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RequestError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["api", "user"])
            .extend(segments);
        Ok(url)
    }

    async fn send_public<B, T>(&self, method: Method, path: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.http.request(method, self.endpoint(path)?).json(body);
        dispatch(req).await
    }

    async fn send<B, T>(
        &self,
        session: &Session,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self
            .http
            .request(method, self.endpoint(path)?)
            .bearer_auth(&session.token)
            .json(body);
        dispatch(req).await
    }

    async fn fetch<T: DeserializeOwned>(&self, session: &Session, path: &[&str]) -> Result<T, ClientError> {
        let req = self
            .http
            .get(self.endpoint(path)?)
            .bearer_auth(&session.token);
        dispatch(req).await
    }
}

async fn dispatch<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ClientError> {
    let resp = req.send().await?;
    let resp = check_status(resp).await?;
    Ok(resp.json::<T>().await?)
}

/// Turns a non-success response into `RequestError::Status` with the
/// server-provided message, or a generic fallback.
async fn check_status(resp: Response) -> Result<Response, RequestError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            ["message", "error"]
                .iter()
                .find_map(|k| body.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

    tracing::warn!(status = status.as_u16(), %message, "API request rejected");

    Err(RequestError::Status {
        status: status.as_u16(),
        message,
    })
}

fn message_of(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn session_io(err: std::io::Error) -> ClientError {
    tracing::error!("Session store failure: {}", err);
    ClientError::Session(err)
}
