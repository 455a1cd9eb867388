use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use flate2::read::GzDecoder;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct Import {
    pub content_encoding: Option<String>,
    pub lines: Vec<String>,
}

/// Stand-in for VictoriaMetrics recording imports and queries.
pub struct MockVictoriaMetrics {
    imports: Mutex<Vec<Import>>,
    queries: Mutex<Vec<String>>,
    query_response: Mutex<Value>,
    import_status: Mutex<u16>,
}

impl MockVictoriaMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            imports: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            query_response: Mutex::new(Self::vector(json!([]))),
            import_status: Mutex::new(204),
        })
    }

    pub async fn start(self: &Arc<Self>) -> Result<String> {
        let router = Router::new()
            .route("/api/v1/import", post(import))
            .route("/api/v1/query", get(query))
            .with_state(self.clone());
        super::serve(router).await
    }

    pub fn vector(result: Value) -> Value {
        json!({ "status": "success", "data": { "resultType": "vector", "result": result } })
    }

    pub fn set_query_response(&self, response: Value) {
        *self.query_response.lock().unwrap() = response;
    }

    pub fn set_import_status(&self, status: u16) {
        *self.import_status.lock().unwrap() = status;
    }

    pub fn imports(&self) -> Vec<Import> {
        self.imports.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

async fn import(
    State(vm): State<Arc<MockVictoriaMetrics>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_encoding = headers
        .get("content-encoding")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mut text = String::new();
    let decoded = match content_encoding.as_deref() {
        Some("gzip") => GzDecoder::new(body.as_ref()).read_to_string(&mut text),
        _ => body.as_ref().read_to_string(&mut text),
    };
    if decoded.is_err() {
        return (StatusCode::BAD_REQUEST, "cannot decode body").into_response();
    }

    let status = *vm.import_status.lock().unwrap();
    if status < 300 {
        vm.imports.lock().unwrap().push(Import {
            content_encoding,
            lines: text.lines().map(str::to_string).collect(),
        });
    }
    (StatusCode::from_u16(status).unwrap(), "").into_response()
}

async fn query(
    State(vm): State<Arc<MockVictoriaMetrics>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(query) = params.get("query") else {
        return (StatusCode::BAD_REQUEST, "missing query").into_response();
    };
    vm.queries.lock().unwrap().push(query.clone());
    let response = vm.query_response.lock().unwrap().clone();
    Json(response).into_response()
}
