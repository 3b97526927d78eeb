//! Scripted transport for exercising client code without a network.
//!
//! # Design
//! `MockTransport` records every request it is asked to send, then answers
//! from either a fixed response or a handler closure. The log and the
//! responder sit behind one mutex, so concurrent senders see whole
//! append-then-respond steps and the log order matches the call order.
//!
//! Each test builds its own instance; nothing is shared between instances.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::client::ENABLE_HEADER;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

type Handler = Box<dyn FnMut(&HttpRequest) -> Result<HttpResponse, TransportError> + Send>;

/// Body for a scripted response.
///
/// `Json` bodies are wrapped in the API envelope as `{"data": <body>}`;
/// `Text` and `Bytes` go out verbatim.
#[derive(Debug, Clone)]
pub enum MockBody {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<Value> for MockBody {
    fn from(value: Value) -> Self {
        MockBody::Json(value)
    }
}

impl From<&str> for MockBody {
    fn from(text: &str) -> Self {
        MockBody::Text(text.to_string())
    }
}

impl From<String> for MockBody {
    fn from(text: String) -> Self {
        MockBody::Text(text)
    }
}

impl From<Vec<u8>> for MockBody {
    fn from(bytes: Vec<u8>) -> Self {
        MockBody::Bytes(bytes)
    }
}

/// Build a response with `status` and `body`, applying the envelope rule of
/// `MockBody`.
pub fn mock_response(status: u16, body: impl Into<MockBody>) -> HttpResponse {
    let bytes = match body.into() {
        MockBody::Json(value) => serde_json::json!({ "data": value }).to_string().into_bytes(),
        MockBody::Text(text) => text.into_bytes(),
        MockBody::Bytes(bytes) => bytes,
    };
    HttpResponse::new(status, bytes)
}

struct State {
    requests: Vec<HttpRequest>,
    handler: Handler,
}

/// A `Transport` that answers from a script and keeps every request.
pub struct MockTransport {
    state: Mutex<State>,
}

impl MockTransport {
    /// Answer every request with `status` and `body`.
    pub fn new(status: u16, body: impl Into<MockBody>) -> Self {
        Self::from_response(mock_response(status, body))
    }

    /// Answer every request with a clone of `response`.
    pub fn from_response(response: HttpResponse) -> Self {
        Self::with_handler(move |_| Ok(response.clone()))
    }

    /// Answer each request by calling `handler`, for scenarios where the
    /// response depends on the request or on how many calls came before.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: FnMut(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + 'static,
    {
        Self {
            state: Mutex::new(State {
                requests: Vec::new(),
                handler: Box::new(handler),
            }),
        }
    }

    /// Answer requests in order from `responses`; once they run out every
    /// further call fails with a scripted transport error.
    pub fn with_sequence(responses: impl IntoIterator<Item = HttpResponse>) -> Self {
        let mut responses = responses.into_iter().collect::<Vec<_>>().into_iter();
        Self::with_handler(move |request| {
            responses.next().ok_or_else(|| {
                TransportError::Scripted(format!(
                    "no scripted response left for {} {}",
                    request.method, request.url
                ))
            })
        })
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Assertion view over the most recent request, or `None` before the
    /// first send.
    pub fn last_request(&self) -> Option<RequestAssertion> {
        self.lock()
            .requests
            .last()
            .cloned()
            .map(RequestAssertion::new)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.lock();
        state.requests.push(request.clone());
        trace!(
            method = %request.method,
            url = %request.url,
            count = state.requests.len(),
            "captured request"
        );
        (state.handler)(request)
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.request_count())
            .finish_non_exhaustive()
    }
}

/// Read-only view over one captured request.
#[derive(Debug, Clone)]
pub struct RequestAssertion {
    request: HttpRequest,
}

impl RequestAssertion {
    pub fn new(request: HttpRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn method(&self) -> HttpMethod {
        self.request.method
    }

    /// URL path without the query string. Empty if the URL does not parse.
    pub fn path(&self) -> String {
        self.parsed_url()
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }

    /// Query parameters; repeated keys keep every value in order.
    pub fn query(&self) -> HashMap<String, Vec<String>> {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(url) = self.parsed_url() {
            for (key, value) in url.query_pairs() {
                params
                    .entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned());
            }
        }
        params
    }

    /// First value of query parameter `key`.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.parsed_url()?
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// JSON-decoded request body, `Ok(None)` when there is no body.
    ///
    /// The captured body is left untouched, so this can be called repeatedly.
    pub fn body(&self) -> Result<Option<Value>, serde_json::Error> {
        self.request
            .body
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }

    /// Whether `feature` is listed in the `Asana-Enable` header.
    ///
    /// Flags are compared exactly after trimming surrounding whitespace, so
    /// `"a, b"` lists `b`.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.header(ENABLE_HEADER)
            .is_some_and(|value| value.split(',').any(|flag| flag.trim() == feature))
    }

    fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.request.url).ok()
    }
}
