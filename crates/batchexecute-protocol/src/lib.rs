//! Request builder and response decoder for the batchexecute RPC transport.
//!
//! batchexecute multiplexes several logical calls into one HTTP POST and
//! answers with a line-framed stream of envelopes.
//!
//! # Request Overview
//!
//! ```text
//! POST https://{host}/_/{app}/data/batchexecute?rpcids={csv}&_reqid={6 digits}
//! content-type: application/x-www-form-urlencoded;charset=utf-8
//!
//! f.req=[[["rpcId","[args]",null,"generic"], ...]]
//! ```
//!
//! # Response Formats
//!
//! - default (`""`): two framing lines, then one JSON array of envelopes
//! - compressed (`"c"`): `<length>\n<envelope>` blocks
//! - protobuf (`"b"`): not supported
//!
//! # Example
//!
//! ```rust
//! use batchexecute_protocol::{BatchRequest, ResponseFormat, RpcCall, decode};
//!
//! let calls = vec![RpcCall::new("Abc", "[1,2]")];
//! let request = BatchRequest::build("example.com", "App", &calls).unwrap();
//! assert!(request.url().as_str().starts_with("https://example.com/_/App/data/batchexecute"));
//!
//! let raw = "1\n2\n[[\"wrb.fr\",\"Abc\",\"[1,2]\",null,null,null,\"generic\"]]";
//! let results = decode(raw, ResponseFormat::Default, true, request.rpc_ids()).unwrap();
//! assert_eq!(results[0].rpc_id, "Abc");
//! ```

mod decode;
mod error;
mod framing;
mod reqid;
mod request;
mod types;

pub use decode::{decode, decode_tagged, sorted_set};
pub use error::{ErrorKind, ProtocolError, ProtocolResult};
pub use framing::{Chunk, CompressedChunks};
pub use reqid::{CounterReqId, REQID_MAX, REQID_MIN, RandomReqId, ReqIdSource};
pub use request::BatchRequest;
pub use types::{DecodedResult, ResponseFormat, RpcCall};

/// Marker carried in element 0 of every data envelope.
pub const DATA_ENVELOPE_MARKER: &str = "wrb.fr";

/// Sequence tag used when exactly one call is in flight.
pub const GENERIC_TAG: &str = "generic";

/// Content type of the request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";

/// Name of the form field carrying the multiplexed call list.
pub const FREQ_FIELD: &str = "f.req";
