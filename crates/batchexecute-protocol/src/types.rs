//! Logical calls, decoded results and response formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// One logical remote call: an rpc id plus its pre-serialized arguments.
///
/// The argument blob is embedded as-is into the request body; it must
/// already be valid JSON (usually a JSON array).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcCall {
    /// RPC identifier, e.g. "Qxytce".
    pub id: String,
    /// JSON-encoded arguments.
    pub args: String,
}

impl RpcCall {
    /// Creates a call from an already serialized argument blob.
    pub fn new(id: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            args: args.into(),
        }
    }

    /// Creates a call by serializing `args` to JSON.
    pub fn from_args<A: Serialize + ?Sized>(id: impl Into<String>, args: &A) -> ProtocolResult<Self> {
        let args = serde_json::to_string(args).map_err(ProtocolError::Serialization)?;
        Ok(Self::new(id, args))
    }
}

/// One decoded response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedResult {
    /// Sequence index ("generic" maps to 1).
    pub index: i64,
    /// RPC identifier echoed by the server.
    #[serde(rename = "id")]
    pub rpc_id: String,
    /// Decoded payload.
    pub data: Value,
}

impl DecodedResult {
    /// Creates a decoded result.
    pub fn new(index: i64, rpc_id: impl Into<String>, data: Value) -> Self {
        Self {
            index,
            rpc_id: rpc_id.into(),
            data,
        }
    }

    /// Deserializes the payload into a concrete type.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> ProtocolResult<T> {
        T::deserialize(&self.data).map_err(|e| ProtocolError::InvalidData(e.to_string()))
    }
}

/// Response format selected by the `rt` tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Tag `""`: two framing lines, then a JSON array of envelopes.
    #[default]
    Default,
    /// Tag `"c"`: length-marked chunks, one envelope per chunk.
    Compressed,
    /// Tag `"b"`: protobuf, never decoded.
    Protobuf,
}

impl ResponseFormat {
    /// Returns the wire tag for this format.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Compressed => "c",
            Self::Protobuf => "b",
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Default),
            "c" => Ok(Self::Compressed),
            "b" => Ok(Self::Protobuf),
            other => Err(ProtocolError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Compressed => f.write_str("compressed"),
            Self::Protobuf => f.write_str("protobuf"),
        }
    }
}
