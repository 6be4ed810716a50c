//! HTTP mock server helpers for testing outbound HTTP calls.
//!
//! This module provides a thin wrapper around `wiremock` for declarative
//! HTTP stubbing of the Mochi API.
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::common::http_mock::MockHttpServer;
//!
//! #[tokio::test]
//! async fn test_external_api_call() {
//!     let server = MockHttpServer::start().await;
//!
//!     server.expect_get("/decks/")
//!         .respond_with_json(json!({"docs": []}))
//!         .mount()
//!         .await;
//!
//!     let api = HttpMochiApi::new(server.url(), "key");
//! }
//! ```
//!
//! # Patterns
//!
//! - **Success response**: `.respond_with_json(value)`
//! - **Error response**: `.respond_with_status(500)`, optionally `.with_json_response(value)`
//! - **Timeout simulation**: `.respond_with_delay(Duration::from_secs(30))`
//! - **Request verification**: `.with_header(..)`, `.with_json_body(..)`, `.expect_times(1)`

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use mochi_client::{ApiConfig, HttpMochiApi, MochiClient};
use serde_json::Value;

pub use wiremock::matchers::{body_json, header, method, path, query_param};
pub use wiremock::MockServer as WiremockServer;
pub use wiremock::{Mock, ResponseTemplate};

use super::{listing, TEST_API_KEY};

/// Expected `Authorization` header for an API key (key as user, empty password).
pub fn basic_auth(api_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{api_key}:")))
}

/// A running stub server.
pub struct MockHttpServer {
    server: WiremockServer,
}

impl MockHttpServer {
    pub async fn start() -> Self {
        Self {
            server: WiremockServer::start().await,
        }
    }

    /// Base URL to hand to the client under test.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// The wrapped `wiremock` server, for matchers this wrapper doesn't cover.
    pub fn inner(&self) -> &WiremockServer {
        &self.server
    }

    pub fn expect_get(&self, path: &str) -> StubBuilder<'_> {
        StubBuilder::new(&self.server, "GET", path)
    }

    pub fn expect_post(&self, path: &str) -> StubBuilder<'_> {
        StubBuilder::new(&self.server, "POST", path)
    }

    pub fn expect_delete(&self, path: &str) -> StubBuilder<'_> {
        StubBuilder::new(&self.server, "DELETE", path)
    }

    /// Stub `GET /decks/` with a single page containing `decks`.
    pub async fn stub_decks(&self, decks: Vec<Value>) {
        self.expect_get("/decks/")
            .with_header("authorization", &basic_auth(TEST_API_KEY))
            .respond_with_json(listing(decks))
            .mount()
            .await;
    }

    /// Transport pointed at this server, authenticated with [`TEST_API_KEY`].
    pub fn api(&self) -> HttpMochiApi {
        HttpMochiApi::new(self.url(), TEST_API_KEY)
    }

    /// Connect a [`MochiClient`] to this server.
    #[allow(clippy::expect_used)]
    pub async fn connect(&self) -> MochiClient {
        let config = ApiConfig {
            base_url: self.url(),
            timeout_secs: 5,
        };
        MochiClient::connect_with_config(&config, TEST_API_KEY)
            .await
            .expect("connect to mock server")
    }

    /// Requests the server has seen so far.
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Number of requests received for `method` + `path`.
    pub async fn count(&self, http_method: &str, request_path: &str) -> usize {
        self.received()
            .await
            .iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
            .count()
    }
}

/// Declarative stub, mounted with [`StubBuilder::mount`].
pub struct StubBuilder<'a> {
    server: &'a WiremockServer,
    method: &'static str,
    path: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    status: u16,
    response: Option<Value>,
    delay: Option<Duration>,
    times: Option<u64>,
}

impl<'a> StubBuilder<'a> {
    fn new(server: &'a WiremockServer, method: &'static str, path: &str) -> Self {
        Self {
            server,
            method,
            path: path.to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            status: 200,
            response: None,
            delay: None,
            times: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_query_param(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Only match requests whose JSON body equals `body`.
    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn respond_with_json(mut self, body: Value) -> Self {
        self.response = Some(body);
        self
    }

    pub fn respond_with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// JSON body to send along with a non-default status.
    pub fn with_json_response(self, body: Value) -> Self {
        self.respond_with_json(body)
    }

    pub fn respond_with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn expect_times(mut self, times: u64) -> Self {
        self.times = Some(times);
        self
    }

    pub async fn mount(self) {
        let mut mock = Mock::given(method(self.method)).and(path(self.path.as_str()));
        for (name, value) in &self.headers {
            mock = mock.and(header(name.as_str(), value.as_str()));
        }
        for (name, value) in &self.query {
            mock = mock.and(query_param(name.as_str(), value.as_str()));
        }
        if let Some(body) = &self.body {
            mock = mock.and(body_json(body));
        }

        let mut template = ResponseTemplate::new(self.status);
        if let Some(response) = &self.response {
            template = template.set_body_json(response);
        }
        if let Some(delay) = self.delay {
            template = template.set_delay(delay);
        }

        let mut mock = mock.respond_with(template);
        if let Some(times) = self.times {
            mock = mock.expect(times);
        }
        mock.mount(self.server).await;
    }
}
