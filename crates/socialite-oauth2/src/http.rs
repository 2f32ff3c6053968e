// HTTP seam for drivers.
//
// Drivers only ever issue GET requests with query parameters and headers, so
// the contract is a single method. `ReqwestHttpClient` is the production
// implementation; tests swap in a scripted client.

use std::time::Duration;

use async_trait::async_trait;
use socialite_core::{Result, SocialiteError};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An outgoing GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Look up a query parameter by name.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn text(&self) -> &str {
        &self.body
    }
}

/// The HTTP client contract drivers depend on.
///
/// Non-2xx statuses are returned as responses; only transport failures are
/// errors.
#[async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `HttpClient` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SocialiteError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest::Client` (shared pools, custom TLS, proxies).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut req = self.client.get(&request.url).query(&request.query);
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req
            .send()
            .await
            .map_err(|e| SocialiteError::Http(format!("GET {} failed: {e}", request.url)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SocialiteError::Http(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}
