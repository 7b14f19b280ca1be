//! HTTP transport and client for batchexecute requests.
//!
//! The codec in `batchexecute-protocol` never performs I/O. This crate adds
//! the pieces needed to actually talk to a server:
//!
//! - [`Transport`] - posts a form body and returns the raw response text
//! - [`ReqwestTransport`] - the default `reqwest` implementation
//! - [`BatchClient`] - build, post and decode in one call
//! - [`HttpError`] - error type for transport and client operations
//!
//! ```text
//! [RpcCall] -> BatchRequest -> Transport::post -> raw text -> decode -> [DecodedResult]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use batchexecute_http::{BatchClient, BatchClientConfig, HttpSettings, ReqwestTransport};
//! use batchexecute_protocol::RpcCall;
//!
//! let transport = ReqwestTransport::new(HttpSettings::default())?;
//! let client = BatchClient::new(BatchClientConfig::new("news.google.com", "DotsSplashUi"), transport);
//! let results = client.execute(&[RpcCall::new("Qxytce", "[]")]).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{BatchClient, prepare_request};
pub use config::{BatchClientConfig, HttpSettings};
pub use error::{HttpError, HttpErrorCode, HttpResult};
pub use transport::{BoxFuture, HttpRequest, HttpResponse, ReqwestTransport, Transport};
