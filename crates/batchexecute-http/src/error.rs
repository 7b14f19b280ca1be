//! Error types for transport and client operations.

use std::fmt;

use batchexecute_protocol::ProtocolError;
use thiserror::Error;

/// The category of an [`HttpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpErrorCode {
    /// Connection failed, timed out, DNS resolution, etc.
    NetworkError,
    /// Too many requests (429).
    RateLimited,
    /// Server returned a 5xx status, or an unhandled 1xx/3xx status.
    ServerError,
    /// Server rejected the request (4xx other than 429).
    BadRequest,
    /// Request could not be built or response could not be decoded.
    Protocol,
    /// Missing or invalid configuration.
    ConfigurationError,
}

impl HttpErrorCode {
    /// Returns true if the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::BadRequest => "bad_request",
            Self::Protocol => "protocol_error",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for HttpErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while sending a batch or decoding its response.
#[derive(Debug, Error)]
pub struct HttpError {
    code: HttpErrorCode,
    message: String,
    /// HTTP status, when the server answered.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HttpError {
    /// Creates a new error with the given code and message.
    pub fn new(code: HttpErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(HttpErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(HttpErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(HttpErrorCode::ServerError, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HttpErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(HttpErrorCode::ConfigurationError, message)
    }

    /// Maps a non-success HTTP status to an error.
    ///
    /// 429 is rate limiting, other 4xx are bad requests, everything else
    /// (5xx, and 1xx/3xx the transport did not resolve) is a server error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let snippet: String = body.chars().take(200).collect();
        let message = format!("unexpected status {status}: {snippet}");
        let err = match status {
            429 => Self::rate_limited(message),
            400..=499 => Self::bad_request(message),
            _ => Self::server(message),
        };
        err.with_status(status)
    }

    /// Sets the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> HttpErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the underlying protocol error, if this error wraps one.
    pub fn protocol_error(&self) -> Option<&ProtocolError> {
        self.source.as_deref()?.downcast_ref::<ProtocolError>()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<ProtocolError> for HttpError {
    fn from(err: ProtocolError) -> Self {
        Self::new(HttpErrorCode::Protocol, err.to_string()).with_source(err)
    }
}

/// A specialized Result type for transport and client operations.
pub type HttpResult<T> = Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use batchexecute_protocol::ErrorKind;

    #[test]
    fn error_code_retryable() {
        assert!(HttpErrorCode::NetworkError.is_retryable());
        assert!(HttpErrorCode::RateLimited.is_retryable());
        assert!(HttpErrorCode::ServerError.is_retryable());
        assert!(!HttpErrorCode::BadRequest.is_retryable());
        assert!(!HttpErrorCode::Protocol.is_retryable());
    }

    #[test]
    fn from_status_classification() {
        assert_eq!(HttpError::from_status(429, "").code(), HttpErrorCode::RateLimited);
        assert_eq!(HttpError::from_status(503, "").code(), HttpErrorCode::ServerError);
        assert_eq!(HttpError::from_status(400, "").code(), HttpErrorCode::BadRequest);
        assert_eq!(HttpError::from_status(404, "").status(), Some(404));
        assert_eq!(HttpError::from_status(302, "").code(), HttpErrorCode::ServerError);
        assert_eq!(HttpError::from_status(101, "").code(), HttpErrorCode::ServerError);
    }

    #[test]
    fn from_status_truncates_body() {
        let body = "x".repeat(1000);
        let err = HttpError::from_status(500, &body);
        assert!(err.message().len() < 300);
    }

    #[test]
    fn wraps_protocol_error() {
        let err: HttpError = ProtocolError::NoEnvelopes.into();
        assert_eq!(err.code(), HttpErrorCode::Protocol);
        assert!(!err.is_retryable());
        let inner = err.protocol_error().unwrap();
        assert_eq!(inner.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn display() {
        let err = HttpError::network("connection refused");
        assert_eq!(err.to_string(), "network_error: connection refused");
    }
}
