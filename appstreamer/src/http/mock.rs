//! In-memory HTTP client for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::HttpClient;
use crate::error::{StreamerError, StreamerResult};

/// Mock HTTP client serving a fixed route table and recording every request.
///
/// Unknown URLs answer with HTTP 404.
#[derive(Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<String, Result<Vec<u8>, u16>>>,
    requests: Mutex<Vec<String>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), Ok(body.into()));
    }

    pub fn route_json(&self, url: impl Into<String>, value: &serde_json::Value) {
        self.route(url, value.to_string().into_bytes());
    }

    pub fn route_status(&self, url: impl Into<String>, status: u16) {
        self.routes.lock().unwrap().insert(url.into(), Err(status));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.starts_with(prefix))
            .count()
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, url: &str) -> StreamerResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.routes.lock().unwrap().get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(StreamerError::HttpStatus {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(StreamerError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[test]
fn test_mock_client_records_requests() {
    let mock = MockHttpClient::new();
    mock.route("http://example.com/a", b"abc".to_vec());

    assert_eq!(mock.get("http://example.com/a").unwrap(), b"abc".to_vec());
    assert!(mock.get("http://example.com/missing").is_err());
    assert_eq!(mock.requests().len(), 2);
    assert_eq!(mock.count("http://example.com/a"), 1);
}
