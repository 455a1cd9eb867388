use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// `InitiateAuth` call seen by the mock.
#[derive(Debug, Clone)]
pub struct AuthCall {
    pub target: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

/// Stand-in for the Cognito identity provider, answering a fixed body.
pub struct MockCognito {
    calls: Mutex<Vec<AuthCall>>,
    status: u16,
    answer: Value,
}

impl MockCognito {
    pub fn new(status: u16, answer: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            status,
            answer,
        })
    }

    pub async fn start(self: &Arc<Self>) -> Result<String> {
        let router = Router::new()
            .route("/", post(initiate_auth))
            .with_state(self.clone());
        super::serve(router).await
    }

    pub fn calls(&self) -> Vec<AuthCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn initiate_auth(
    State(cognito): State<Arc<MockCognito>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    cognito.calls.lock().unwrap().push(AuthCall {
        target: header("x-amz-target"),
        content_type: header("content-type"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });
    (
        StatusCode::from_u16(cognito.status).unwrap(),
        cognito.answer.to_string(),
    )
        .into_response()
}
