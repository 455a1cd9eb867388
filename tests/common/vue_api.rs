use super::http::RecordedRequest;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::DateTime;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vuesync::datamodel::Scale;

/// Stand-in for the usage API.
///
/// Chart usage answers hold one slot per scale step of the requested
/// `[start, end)` window. Slot `i` of a page is worth `(i + 1) * 0.25`.
pub struct MockVueApi {
    pub devices: Value,
    requests: Mutex<Vec<RecordedRequest>>,
    failure: Mutex<Option<u16>>,
}

impl MockVueApi {
    pub fn new(devices: Value) -> Arc<Self> {
        Arc::new(Self {
            devices,
            requests: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        })
    }

    pub async fn start(self: &Arc<Self>) -> Result<String> {
        let router = Router::new()
            .route("/customers/devices", get(devices))
            .route("/AppAPI", get(app_api))
            .with_state(self.clone());
        super::serve(router).await
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn chart_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.param("apiMethod") == Some("getChartUsage"))
            .collect()
    }

    /// Every following request is answered with this status.
    pub fn fail_with(&self, status: u16) {
        *self.failure.lock().unwrap() = Some(status);
    }

    fn record(
        &self,
        path: &str,
        params: HashMap<String, String>,
        headers: &HeaderMap,
    ) -> Option<Response> {
        self.requests.lock().unwrap().push(RecordedRequest {
            path: path.to_string(),
            params,
            auth_token: headers
                .get("authtoken")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        });
        let failure = *self.failure.lock().unwrap();
        failure.map(|status| {
            (
                StatusCode::from_u16(status).unwrap(),
                "mock failure".to_string(),
            )
                .into_response()
        })
    }
}

async fn devices(
    State(api): State<Arc<MockVueApi>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(failure) = api.record("/customers/devices", params, &headers) {
        return failure;
    }
    Json(json!({ "devices": api.devices })).into_response()
}

async fn app_api(
    State(api): State<Arc<MockVueApi>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(failure) = api.record("/AppAPI", params.clone(), &headers) {
        return failure;
    }
    match params.get("apiMethod").map(String::as_str) {
        Some("getChartUsage") => {
            let usage: Vec<Value> = (0..window_slots(&params))
                .map(|i| json!((i + 1) as f64 * 0.25))
                .collect();
            Json(json!({
                "usageList": usage,
                "firstUsageInstant": params.get("start"),
            }))
            .into_response()
        }
        Some("getDeviceListUsages") => {
            let devices: Vec<Value> = params
                .get("deviceGids")
                .map(String::as_str)
                .unwrap_or_default()
                .split(' ')
                .filter_map(|gid| gid.parse::<u64>().ok())
                .map(|gid| {
                    json!({
                        "deviceGid": gid,
                        "channelUsages": [
                            { "name": "Main", "usage": 1.5, "channelNum": "1,2,3", "nestedDevices": [] },
                            { "name": null, "usage": null, "channelNum": "1", "nestedDevices": [] }
                        ]
                    })
                })
                .collect();
            Json(json!({
                "deviceListUsages": {
                    "instant": params.get("instant"),
                    "scale": params.get("scale"),
                    "devices": devices,
                }
            }))
            .into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unknown apiMethod").into_response(),
    }
}

fn window_slots(params: &HashMap<String, String>) -> i64 {
    let instant = |name: &str| {
        params
            .get(name)
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
    };
    let step = params
        .get("scale")
        .and_then(|scale| scale.parse::<Scale>().ok())
        .and_then(|scale| scale.duration().ok());
    match (instant("start"), instant("end"), step) {
        (Some(start), Some(end), Some(step)) => {
            ((end - start).num_seconds() / step.num_seconds()).max(0)
        }
        _ => 0,
    }
}
