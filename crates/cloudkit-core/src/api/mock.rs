//! Scripted in-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::{ApiRequest, ApiResponse, Transport, TransportError};

pub(crate) const BASE: &str = "http://cloud.test";

pub(crate) fn url(path: &str) -> String {
    format!("{}/{}", BASE, path.trim_start_matches('/'))
}

/// Answers each URL from its own queue and records every request.
#[derive(Default)]
pub(crate) struct MockTransport {
    scripted: Mutex<HashMap<String, VecDeque<Result<ApiResponse, TransportError>>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, path: &str, status: u16, body: Value) -> &Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.push(path, Ok(ApiResponse::json_body(status, &body)))
    }

    pub(crate) fn reply_empty(&self, path: &str, status: u16) -> &Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.push(path, Ok(ApiResponse::new(status, Vec::new())))
    }

    pub(crate) fn fail(&self, path: &str, err: TransportError) -> &Self {
        self.push(path, Err(err))
    }

    fn push(&self, path: &str, result: Result<ApiResponse, TransportError>) -> &Self {
        self.scripted
            .lock()
            .expect("mock lock")
            .entry(url(path))
            .or_default()
            .push_back(result);
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("mock lock").clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        let target = url(path);
        self.requests().iter().filter(|r| r.url == target).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn respond(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url.clone();
        self.requests.lock().expect("mock lock").push(request);
        self.scripted
            .lock()
            .expect("mock lock")
            .get_mut(&url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::Connection(format!(
                    "nothing scripted for {}",
                    url
                )))
            })
    }
}
