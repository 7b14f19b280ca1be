//! Batch client: build, post and decode in one call.

use batchexecute_protocol::{
    BatchRequest, DecodedResult, RandomReqId, ReqIdSource, RpcCall, decode,
};
use tracing::{debug, warn};

use crate::config::BatchClientConfig;
use crate::error::{HttpError, HttpResult};
use crate::transport::{HttpRequest, Transport};

/// Sends logical calls as one batchexecute request and decodes the answer.
pub struct BatchClient<T> {
    config: BatchClientConfig,
    transport: T,
    req_ids: Box<dyn ReqIdSource>,
}

impl<T: Transport> BatchClient<T> {
    /// Creates a client with random request ids.
    pub fn new(config: BatchClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            req_ids: Box::new(RandomReqId),
        }
    }

    /// Replaces the request id source.
    pub fn with_req_ids(mut self, req_ids: impl ReqIdSource + 'static) -> Self {
        self.req_ids = Box::new(req_ids);
        self
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &BatchClientConfig {
        &self.config
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the HTTP request for `calls` without sending it.
    pub fn prepare(&self, calls: &[RpcCall]) -> HttpResult<HttpRequest> {
        prepare_request(&self.config, calls, self.req_ids.as_ref())
    }

    /// Sends `calls` and returns the decoded results, sorted by index.
    ///
    /// In strict mode the returned rpc ids are checked against the ids of
    /// `calls`.
    pub async fn execute(&self, calls: &[RpcCall]) -> HttpResult<Vec<DecodedResult>> {
        let request = self.prepare(calls)?;
        debug!(url = %request.url, calls = calls.len(), "executing batch");

        let response = self.transport.post(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "batchexecute request failed");
            return Err(HttpError::from_status(response.status, &response.body));
        }

        let expected: Vec<&str> = calls.iter().map(|call| call.id.as_str()).collect();
        let results = decode(
            &response.body,
            self.config.response_format,
            self.config.strict,
            &expected,
        )?;

        debug!(results = results.len(), "batch decoded");
        Ok(results)
    }
}

/// Builds the HTTP request for `calls`: URL with the configured extra query
/// parameters, the form content type plus configured headers, and the
/// `f.req` form body.
pub fn prepare_request(
    config: &BatchClientConfig,
    calls: &[RpcCall],
    req_ids: &dyn ReqIdSource,
) -> HttpResult<HttpRequest> {
    let request = BatchRequest::build_with(&config.host, &config.app, calls, req_ids)?;

    let mut headers: Vec<(String, String)> = request
        .headers()
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    headers.extend(config.headers.iter().cloned());

    let (mut url, body) = request.into_parts();
    if !config.query.is_empty() {
        url.query_pairs_mut().extend_pairs(
            config
                .query
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
    }

    Ok(HttpRequest { url, headers, body })
}
