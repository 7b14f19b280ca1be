//! CLI error types.

use std::fmt;

use batchexecute_http::HttpError;
use batchexecute_protocol::ProtocolError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// Invalid command-line input.
    Input(String),
    /// IO error.
    Io(std::io::Error),
    /// Building or decoding failed.
    Protocol(ProtocolError),
    /// Sending the request failed.
    Http(HttpError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Input(msg) => write!(f, "invalid input: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Protocol(err) => write!(f, "protocol error: {}", err),
            Self::Http(err) => write!(f, "request failed: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Protocol(err) => Some(err),
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProtocolError> for CliError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}

impl From<HttpError> for CliError {
    fn from(err: HttpError) -> Self {
        Self::Http(err)
    }
}
