//! In-memory protocol client for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ServiceError, TransportError};
use crate::request::{HttpRequest, RawResponse, RequestOptions};
use crate::transport::ProtocolClient;

enum Route {
    /// Responses served in order; the last one repeats.
    Respond(VecDeque<RawResponse>),
    Fail(String),
}

#[derive(Default)]
pub(crate) struct MockClient {
    routes: Mutex<HashMap<String, Route>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl MockClient {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, url: &str, response: RawResponse) {
        self.respond_sequence(url, vec![response]);
    }

    pub(crate) fn respond_sequence(&self, url: &str, responses: Vec<RawResponse>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Respond(responses.into()));
    }

    pub(crate) fn fail(&self, url: &str, message: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Fail(message.to_string()));
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.seen.lock().unwrap().iter().filter(|r| r.url == url).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProtocolClient for MockClient {
    fn build_request_options(&self, options: &RequestOptions) -> Result<HttpRequest, ServiceError> {
        let mut url = options.url.clone();
        if !options.query_params.is_empty() {
            let query: Vec<String> = options
                .query_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            url = format!("{url}?{}", query.join("&"));
        }
        let body = options
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        Ok(HttpRequest {
            method: options.method,
            url,
            headers: options.headers.clone(),
            body,
        })
    }

    async fn invoke(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let url = request.url.clone();
        self.seen.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&url) {
            Some(Route::Respond(queue)) => {
                let response = if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                };
                response.ok_or_else(|| TransportError::Other(format!("no response for {url}")))
            }
            Some(Route::Fail(message)) => Err(TransportError::Http(message.clone())),
            None => Err(TransportError::Other(format!("no route for {url}"))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
