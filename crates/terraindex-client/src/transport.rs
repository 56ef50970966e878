//! The `HttpTransport` trait: one GET against the node, nothing else.
//!
//! Rate limiting, retries and response decoding live in
//! [`ChainClient`](crate::ChainClient); transports only move bytes, which
//! keeps them trivially fakeable in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClientError;

/// A GET request relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Request {
    pub fn get(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            timeout,
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP answer: status and body, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The async trait every node transport implements.
///
/// Object-safe; stored as `Arc<dyn HttpTransport>` or used as a generic.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// Perform the request. Non-2xx statuses are returned as responses, not
    /// errors; only network failures and timeouts are errors.
    async fn execute(&self, req: &Request) -> Result<HttpResponse, ClientError>;

    /// Base URL this transport talks to.
    fn base_url(&self) -> &str;
}

// ─── reqwest ──────────────────────────────────────────────────────────────────

/// `reqwest`-backed transport. Sends the API key (if any) as the
/// `Authorization` header on every request.
pub struct ReqwestTransport {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            http,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, req: &Request) -> Result<HttpResponse, ClientError> {
        let url = format!("{}{}", self.base_url, req.path);
        let mut builder = self
            .http
            .get(&url)
            .query(&req.query)
            .timeout(req.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.header(reqwest::header::AUTHORIZATION, key);
        }

        let resp = builder.send().await.map_err(|e| map_reqwest(e, req.timeout))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| map_reqwest(e, req.timeout))?;
        Ok(HttpResponse { status, body })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn map_reqwest(e: reqwest::Error, timeout: Duration) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout {
            ms: timeout.as_millis() as u64,
        }
    } else {
        ClientError::Http(e.to_string())
    }
}
