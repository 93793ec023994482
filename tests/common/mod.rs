//! Stub GraphQL data service for integration tests

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

struct StubState {
    responses: HashMap<String, Value>,
    status: StatusCode,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubGraphql {
    pub addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubGraphql {
    /// Serve `responses`, keyed by operation name, as full response bodies
    pub async fn start(responses: Vec<(&str, Value)>) -> Self {
        Self::start_with_status(responses, StatusCode::OK).await
    }

    pub async fn start_with_status(responses: Vec<(&str, Value)>, status: StatusCode) -> Self {
        let state = Arc::new(StubState {
            responses: responses
                .into_iter()
                .map(|(op, body)| (op.to_string(), body))
                .collect(),
            status,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/graphql", post(handle))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        StubGraphql { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/graphql", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests recorded for one operation
    pub fn requests_for(&self, operation: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.body["operationName"] == operation)
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();

    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { authorization, body });

    if state.status != StatusCode::OK {
        return (state.status, Json(json!({"message": "upstream unavailable"})));
    }

    let response = match state.responses.get(&operation) {
        Some(response) => response.clone(),
        None => {
            let mut data = serde_json::Map::new();
            data.insert(operation, Value::Null);
            json!({ "data": data })
        }
    };
    (StatusCode::OK, Json(response))
}
