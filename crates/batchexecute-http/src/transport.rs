//! HTTP transport abstraction.
//!
//! The codec only needs one capability from the network: post a form body
//! to a URL and hand back the status and raw response text. [`Transport`]
//! captures that; [`ReqwestTransport`] implements it with `reqwest`.

use std::future::Future;
use std::pin::Pin;

use tracing::trace;
use url::Url;

use crate::config::HttpSettings;
use crate::error::{HttpError, HttpResult};

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An outgoing POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Target URL including the query string.
    pub url: Url,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Form-encoded body.
    pub body: String,
}

impl HttpRequest {
    /// Returns the value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends batch requests over the network.
///
/// Implementations must not interpret the body; status handling and
/// decoding happen in [`BatchClient`](crate::BatchClient).
pub trait Transport: Send + Sync {
    /// Posts the request and returns the response.
    fn post(&self, request: HttpRequest) -> BoxFuture<'_, HttpResult<HttpResponse>>;
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given settings.
    pub fn new(settings: HttpSettings) -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(&settings.user_agent)
            .build()
            .map_err(|e| {
                HttpError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { client })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn post(&self, request: HttpRequest) -> BoxFuture<'_, HttpResult<HttpResponse>> {
        Box::pin(async move {
            let HttpRequest { url, headers, body } = request;
            trace!(url = %url, bytes = body.len(), "sending request");

            let mut builder = self.client.post(url);
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder.body(body).send().await.map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                HttpError::network(message).with_source(e)
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                HttpError::network(format!("failed to read response body: {}", e)).with_source(e)
            })?;

            trace!(status, bytes = body.len(), "received response");
            Ok(HttpResponse { status, body })
        })
    }
}
