//! Protocol error types.

use std::fmt;

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Broad classification of a [`ProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Builder arguments were unusable (empty host, no calls, ...).
    InvalidRequest,
    /// Unparsable JSON, wrong tuple shape, non-string where a string is expected.
    MalformedInput,
    /// Protobuf or unknown response format.
    UnsupportedFormat,
    /// No envelope survived decoding.
    EmptyResult,
    /// Expected and returned rpc ids disagree.
    StrictMismatch,
    /// A payload decoded to null in strict mode.
    StrictEmptyPayload,
    /// The request body could not be serialized.
    SerializationFailure,
}

impl ErrorKind {
    /// Returns a stable, snake_case name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::MalformedInput => "malformed_input",
            Self::UnsupportedFormat => "unsupported_format",
            Self::EmptyResult => "empty_result",
            Self::StrictMismatch => "strict_mismatch",
            Self::StrictEmptyPayload => "strict_empty_payload",
            Self::SerializationFailure => "serialization_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while building requests or decoding responses.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The request could not be built from the given arguments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Host and app did not form a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to serialize the call list or call arguments.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The raw response does not have the expected framing.
    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    /// The envelope list (or a compressed chunk) is not valid JSON.
    #[error("invalid JSON envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    /// Element 6 of an envelope is neither "generic" nor a decimal index.
    #[error("invalid index: {0:?}")]
    InvalidIndex(String),

    /// A positional field has the wrong JSON type.
    #[error("unexpected envelope shape: {field} must be a {expected}")]
    UnexpectedShape {
        field: &'static str,
        expected: &'static str,
    },

    /// Element 2 of an envelope is not a JSON-encoded string.
    #[error("invalid JSON data: {0}")]
    InvalidData(String),

    /// Response format tag "b" (protobuf).
    #[error("decoding format {0:?} (protobuf) is not implemented")]
    NotImplemented(String),

    /// Unknown response format tag.
    #[error("invalid format: {0:?}")]
    InvalidFormat(String),

    /// No envelope survived decoding.
    #[error("could not decode any envelope, check the format of the raw response")]
    NoEnvelopes,

    /// A payload decoded to null while decoding strictly.
    #[error("envelope {index} ({rpc_id}): data is empty (strict)")]
    EmptyPayload { index: i64, rpc_id: String },

    /// Number of returned envelopes differs from the number of sent calls.
    #[error("strict: mismatch in/out rpc ids count, expected: {expected}, got: {got}")]
    CountMismatch { expected: usize, got: usize },

    /// Distinct returned rpc ids differ from the distinct sent rpc ids.
    #[error("strict: mismatch in/out rpc ids, expected: {expected:?}, got: {got:?}")]
    IdMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
}

impl ProtocolError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) | Self::InvalidUrl(_) => ErrorKind::InvalidRequest,
            Self::Serialization(_) => ErrorKind::SerializationFailure,
            Self::InvalidResponse(_)
            | Self::InvalidEnvelope(_)
            | Self::InvalidIndex(_)
            | Self::UnexpectedShape { .. }
            | Self::InvalidData(_) => ErrorKind::MalformedInput,
            Self::NotImplemented(_) | Self::InvalidFormat(_) => ErrorKind::UnsupportedFormat,
            Self::NoEnvelopes => ErrorKind::EmptyResult,
            Self::EmptyPayload { .. } => ErrorKind::StrictEmptyPayload,
            Self::CountMismatch { .. } | Self::IdMismatch { .. } => ErrorKind::StrictMismatch,
        }
    }
}
