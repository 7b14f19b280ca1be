//! Client and transport configuration.

use std::time::Duration;

use batchexecute_protocol::ResponseFormat;

/// Configuration for a [`BatchClient`](crate::BatchClient).
#[derive(Debug, Clone)]
pub struct BatchClientConfig {
    /// Target host, e.g. "news.google.com".
    pub host: String,

    /// Application name used in the path, e.g. "DotsSplashUi".
    pub app: String,

    /// Format used to decode responses.
    pub response_format: ResponseFormat,

    /// Whether to decode strictly (no null payloads, rpc ids must match).
    pub strict: bool,

    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,

    /// Extra query parameters appended after `rpcids` and `_reqid`.
    pub query: Vec<(String, String)>,
}

impl BatchClientConfig {
    /// Creates a configuration for the given host and application.
    pub fn new(host: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            app: app.into(),
            response_format: ResponseFormat::Default,
            strict: false,
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Sets the response format.
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Enables or disables strict decoding.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query parameter sent with every request.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Settings for the [`ReqwestTransport`](crate::ReqwestTransport).
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl HttpSettings {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("batchexecute/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
