//! Request execution shared by every resource method.
//!
//! # Design
//! `AsanaClient` owns a `Transport` and a `ClientConfig`. Each call goes
//! through three steps, kept separate so each can be tested on its own:
//!
//! 1. `build_request` turns a path, query options and an optional body into
//!    an `HttpRequest`. Write bodies are wrapped as `{"data": ...}`.
//! 2. The transport sends it.
//! 3. `parse_response` decodes the `{"data", "next_page"}` envelope of a 2xx
//!    response, or classifies anything else into an `ApiError`.
//!
//! Each request gets a fresh UUID that tags its log lines and any `ApiError`
//! it produces.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, ErrorPayload, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::Options;
use crate::pagination::{NextPage, Page, PageRequest, Pager};
use crate::transport::{Transport, UreqTransport};

pub const ENABLE_HEADER: &str = "Asana-Enable";
pub const DISABLE_HEADER: &str = "Asana-Disable";

#[derive(Deserialize)]
struct Envelope<R> {
    data: R,
    #[serde(default)]
    next_page: Option<NextPage>,
}

/// Client for the Asana REST API over any [`Transport`].
#[derive(Debug, Clone)]
pub struct AsanaClient<T> {
    transport: T,
    config: ClientConfig,
}

impl AsanaClient<UreqTransport> {
    /// Client backed by a real HTTP agent.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::with_timeout(config.timeout);
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> AsanaClient<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        options: &Options,
        body: Option<&Value>,
    ) -> Result<HttpRequest> {
        let mut url = Url::parse(&format!("{}{path}", self.config.base_url))
            .map_err(TransportError::from)?;
        let pairs = options.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ];
        if !self.config.enabled_features.is_empty() {
            headers.push((
                ENABLE_HEADER.to_string(),
                self.config.enabled_features.join(","),
            ));
        }
        if !self.config.disabled_features.is_empty() {
            headers.push((
                DISABLE_HEADER.to_string(),
                self.config.disabled_features.join(","),
            ));
        }
        headers.extend(self.config.default_headers.iter().cloned());

        let body = match body {
            Some(data) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                let wrapped = serde_json::json!({ "data": data });
                Some(serde_json::to_string(&wrapped).map_err(TransportError::Encode)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Decode a 2xx envelope, or classify a failure.
    pub fn parse_response<R: DeserializeOwned>(
        &self,
        response: HttpResponse,
        request_id: &str,
    ) -> Result<(R, Option<NextPage>)> {
        let response = self.check_response(response, request_id)?;
        let envelope: Envelope<R> =
            serde_json::from_slice(&response.body).map_err(TransportError::Decode)?;
        Ok((envelope.data, envelope.next_page))
    }

    /// Pass a 2xx response through untouched; classify anything else.
    pub fn check_response(&self, response: HttpResponse, request_id: &str) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }
        let payload = ErrorPayload::parse(&response.body);
        let err = ApiError::from_response(
            &response,
            payload.as_ref(),
            request_id,
            self.config.retry_after_policy,
        );
        warn!(
            request_id,
            status = err.status_code,
            message = %err.message,
            "API request failed"
        );
        Err(Error::Api(err))
    }

    /// Build, send and decode one request.
    pub fn execute<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        options: &Options,
        body: Option<&Value>,
    ) -> Result<(R, Option<NextPage>)> {
        let (request_id, response) = self.send(method, path, options, body)?;
        self.parse_response(response, &request_id)
    }

    /// Like `execute`, for endpoints whose response data is not needed.
    pub fn execute_empty(
        &self,
        method: HttpMethod,
        path: &str,
        options: &Options,
        body: Option<&Value>,
    ) -> Result<()> {
        let (request_id, response) = self.send(method, path, options, body)?;
        self.check_response(response, &request_id)?;
        Ok(())
    }

    pub fn get<R: DeserializeOwned>(&self, path: &str, options: &Options) -> Result<R> {
        let (data, _) = self.execute(HttpMethod::Get, path, options, None)?;
        Ok(data)
    }

    /// Fetch one page of a list endpoint.
    pub fn get_page<R: DeserializeOwned>(&self, path: &str, options: &Options) -> Result<Page<R>> {
        let (items, next_page) = self.execute(HttpMethod::Get, path, options, None)?;
        Ok(Page::new(items, next_page))
    }

    /// Fetch every page of a list endpoint using the configured page size.
    pub fn get_all<R: DeserializeOwned>(&self, path: &str, options: &Options) -> Result<Vec<R>> {
        Pager::new(|page: &PageRequest| self.get_page::<R>(path, &options.clone().page(page)))
            .page_size(self.config.page_size)
            .fetch_all()
    }

    pub fn post<R: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<R> {
        let body = serde_json::to_value(body).map_err(TransportError::Encode)?;
        let (data, _) = self.execute(HttpMethod::Post, path, &Options::new(), Some(&body))?;
        Ok(data)
    }

    /// POST whose response data is discarded.
    pub fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let body = serde_json::to_value(body).map_err(TransportError::Encode)?;
        self.execute_empty(HttpMethod::Post, path, &Options::new(), Some(&body))
    }

    pub fn put<R: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<R> {
        let body = serde_json::to_value(body).map_err(TransportError::Encode)?;
        let (data, _) = self.execute(HttpMethod::Put, path, &Options::new(), Some(&body))?;
        Ok(data)
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        self.execute_empty(HttpMethod::Delete, path, &Options::new(), None)
    }

    fn send(
        &self,
        method: HttpMethod,
        path: &str,
        options: &Options,
        body: Option<&Value>,
    ) -> Result<(String, HttpResponse)> {
        let request = self.build_request(method, path, options, body)?;
        let request_id = Uuid::new_v4().to_string();
        debug!(
            request_id = %request_id,
            method = %request.method,
            url = %request.url,
            "sending request"
        );
        let response = self.transport.send(&request)?;
        debug!(request_id = %request_id, status = response.status, "received response");
        Ok((request_id, response))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mock::MockTransport;

    fn client(mock: MockTransport) -> AsanaClient<MockTransport> {
        let config = ClientConfig::builder()
            .base_url("http://localhost:3000/api/1.0")
            .build();
        AsanaClient::with_transport(mock, config)
    }

    #[test]
    fn build_request_appends_path_and_query() {
        let c = client(MockTransport::new(200, json!({})));
        let req = c
            .build_request(
                HttpMethod::Get,
                "/users",
                &Options::new().workspace("123").limit(50),
                None,
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/api/1.0/users?limit=50&workspace=123"
        );
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn build_request_without_options_has_no_query_string() {
        let c = client(MockTransport::new(200, json!({})));
        let req = c
            .build_request(HttpMethod::Get, "/users/me", &Options::new(), None)
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/1.0/users/me");
    }

    #[test]
    fn build_request_wraps_body_in_data() {
        let c = client(MockTransport::new(200, json!({})));
        let req = c
            .build_request(
                HttpMethod::Post,
                "/memberships",
                &Options::new(),
                Some(&json!({"member": "1"})),
            )
            .unwrap();
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"data": {"member": "1"}}));
    }

    #[test]
    fn build_request_sends_feature_headers() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:3000")
            .enable("new_goal_memberships")
            .enable("new_user_task_lists")
            .disable("string_ids")
            .header("Authorization", "Bearer token")
            .build();
        let c = AsanaClient::with_transport(MockTransport::new(200, json!({})), config);
        let req = c
            .build_request(HttpMethod::Get, "/users/me", &Options::new(), None)
            .unwrap();
        assert_eq!(
            req.header(ENABLE_HEADER),
            Some("new_goal_memberships,new_user_task_lists")
        );
        assert_eq!(req.header(DISABLE_HEADER), Some("string_ids"));
        assert_eq!(req.header("authorization"), Some("Bearer token"));
    }

    #[test]
    fn build_request_rejects_unparseable_base_url() {
        let config = ClientConfig::builder().base_url("not a url").build();
        let c = AsanaClient::with_transport(MockTransport::new(200, json!({})), config);
        let err = c
            .build_request(HttpMethod::Get, "/users", &Options::new(), None)
            .unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn parse_response_reads_data_and_cursor() {
        let c = client(MockTransport::new(200, json!({})));
        let response = HttpResponse::new(
            200,
            r#"{"data":[{"gid":"1"}],"next_page":{"offset":"abc","path":"/users?offset=abc"}}"#,
        );
        let (data, next): (Vec<Value>, _) = c.parse_response(response, "req").unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(next.unwrap().offset, "abc");
    }

    #[test]
    fn parse_response_treats_null_cursor_as_end() {
        let c = client(MockTransport::new(200, json!({})));
        let response = HttpResponse::new(200, r#"{"data":[],"next_page":null}"#);
        let (data, next): (Vec<Value>, _) = c.parse_response(response, "req").unwrap();
        assert!(data.is_empty());
        assert!(next.is_none());
    }

    #[test]
    fn parse_response_bad_json_is_a_transport_error() {
        let c = client(MockTransport::new(200, json!({})));
        let err = c
            .parse_response::<Value>(HttpResponse::new(200, "not json"), "req")
            .unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Decode(_))));
    }

    #[test]
    fn parse_response_classifies_failures() {
        let c = client(MockTransport::new(200, json!({})));
        let response = HttpResponse::new(
            404,
            r#"{"errors":[{"message":"user: Unknown object: 999","help":"See docs"}]}"#,
        );
        let err = c.parse_response::<Value>(response, "req-42").unwrap_err();
        let api = err.api_error().unwrap();
        assert!(api.is_not_found());
        assert_eq!(api.message, "user: Unknown object: 999");
        assert_eq!(api.request_id, "req-42");
    }

    #[test]
    fn execute_stamps_generated_request_id_on_errors() {
        let c = client(MockTransport::new(500, "upstream exploded"));
        let err = c.get::<Value>("/users/me", &Options::new()).unwrap_err();
        let api = err.api_error().unwrap();
        assert!(api.is_recoverable());
        assert_eq!(api.message, "Unknown error");
        assert!(Uuid::parse_str(&api.request_id).is_ok());
    }

    #[test]
    fn transport_failures_pass_through_unclassified() {
        let mock = MockTransport::with_handler(|_| {
            Err(TransportError::Connection("connection refused".to_string()))
        });
        let c = client(mock);
        let err = c.get::<Value>("/users/me", &Options::new()).unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Connection(_))));
        assert_eq!(c.transport().request_count(), 1);
    }

    #[test]
    fn get_all_threads_offsets_through_pages() {
        let mock = MockTransport::with_sequence([
            HttpResponse::new(200, r#"{"data":[1,2],"next_page":{"offset":"o2"}}"#),
            HttpResponse::new(200, r#"{"data":[3],"next_page":null}"#),
        ]);
        let c = client(mock);
        let all: Vec<u32> = c.get_all("/things", &Options::new().workspace("w")).unwrap();
        assert_eq!(all, vec![1, 2, 3]);

        let requests = c.transport().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].url,
            "http://localhost:3000/api/1.0/things?limit=50&workspace=w"
        );
        assert_eq!(
            requests[1].url,
            "http://localhost:3000/api/1.0/things?limit=50&offset=o2&workspace=w"
        );
    }

    #[test]
    fn delete_ignores_empty_body() {
        let c = client(MockTransport::from_response(HttpResponse::new(204, "")));
        c.delete("/custom_fields/1").unwrap();
        assert_eq!(c.transport().last_request().unwrap().method(), HttpMethod::Delete);
    }

    #[test]
    fn put_sends_wrapped_body() {
        let c = client(MockTransport::new(200, json!({"gid": "1", "name": "Renamed"})));
        let updated: Value = c.put("/custom_fields/1", &json!({"name": "Renamed"})).unwrap();
        assert_eq!(updated["name"], "Renamed");
        let body = c.transport().last_request().unwrap().body().unwrap().unwrap();
        assert_eq!(body, json!({"data": {"name": "Renamed"}}));
    }
}
