//! Outbound request building.
//!
//! Every call becomes one wire tuple `[id, args, null, tag]` where `tag` is
//! `"generic"` when exactly one call is sent and the 1-based position of the
//! call otherwise. The tuples are wrapped in one more array and sent as the
//! `f.req` form field.

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{ProtocolError, ProtocolResult};
use crate::reqid::{RandomReqId, ReqIdSource};
use crate::types::RpcCall;
use crate::{FORM_CONTENT_TYPE, FREQ_FIELD, GENERIC_TAG};

/// Wire tuple for one call: `[id, args, null, tag]`.
#[derive(Debug, Serialize)]
struct FreqEntry<'a>(&'a str, &'a str, Option<()>, String);

/// A fully built batchexecute request, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    url: Url,
    req_id: u32,
    rpc_ids: Vec<String>,
    f_req: String,
}

impl BatchRequest {
    /// Builds a request with a random request id.
    ///
    /// # Example
    ///
    /// ```rust
    /// use batchexecute_protocol::{BatchRequest, RpcCall};
    ///
    /// let request = BatchRequest::build("example.com", "App", &[RpcCall::new("Abc", "[]")]).unwrap();
    /// assert_eq!(request.f_req(), r#"[[["Abc","[]",null,"generic"]]]"#);
    /// ```
    pub fn build(host: &str, app: &str, calls: &[RpcCall]) -> ProtocolResult<Self> {
        Self::build_with(host, app, calls, &RandomReqId)
    }

    /// Builds a request drawing its request id from `req_ids`.
    pub fn build_with(
        host: &str,
        app: &str,
        calls: &[RpcCall],
        req_ids: &dyn ReqIdSource,
    ) -> ProtocolResult<Self> {
        validate_segment("host", host)?;
        validate_segment("app", app)?;
        if calls.is_empty() {
            return Err(ProtocolError::InvalidRequest(
                "at least one rpc call is required".to_string(),
            ));
        }

        let rpc_ids: Vec<String> = calls.iter().map(|c| c.id.clone()).collect();
        let req_id = req_ids.next_req_id();

        let mut url = Url::parse(&format!("https://{host}/_/{app}/data/batchexecute"))?;
        url.query_pairs_mut()
            .append_pair("rpcids", &rpc_ids.join(","))
            .append_pair("_reqid", &req_id.to_string());

        let f_req = serde_json::to_string(&[freq_list(calls)]).map_err(ProtocolError::Serialization)?;

        debug!(rpc_ids = ?rpc_ids, req_id, url = %url, "built batchexecute request");

        Ok(Self {
            url,
            req_id,
            rpc_ids,
            f_req,
        })
    }

    /// Returns the request URL, including the query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the request id sent as `_reqid`.
    pub fn req_id(&self) -> u32 {
        self.req_id
    }

    /// Returns the rpc ids in call order, duplicates included.
    pub fn rpc_ids(&self) -> &[String] {
        &self.rpc_ids
    }

    /// Returns the raw JSON value of the `f.req` field.
    pub fn f_req(&self) -> &str {
        &self.f_req
    }

    /// Returns the urlencoded form body (`f.req=...`).
    pub fn form_body(&self) -> String {
        format!("{}={}", FREQ_FIELD, urlencoding::encode(&self.f_req))
    }

    /// Returns the headers the request must be sent with.
    pub fn headers(&self) -> [(&'static str, &'static str); 1] {
        [("content-type", FORM_CONTENT_TYPE)]
    }

    /// Splits the request into its URL and form body.
    pub fn into_parts(self) -> (Url, String) {
        let body = self.form_body();
        (self.url, body)
    }
}

fn freq_list(calls: &[RpcCall]) -> Vec<FreqEntry<'_>> {
    let single = calls.len() == 1;
    calls
        .iter()
        .enumerate()
        .map(|(i, call)| {
            let tag = if single {
                GENERIC_TAG.to_string()
            } else {
                (i + 1).to_string()
            };
            FreqEntry(&call.id, &call.args, None, tag)
        })
        .collect()
}

fn validate_segment(name: &str, value: &str) -> ProtocolResult<()> {
    if value.is_empty() {
        return Err(ProtocolError::InvalidRequest(format!("{name} must not be empty")));
    }
    if value.contains(['/', '?', '#']) {
        return Err(ProtocolError::InvalidRequest(format!(
            "{name} must not contain '/', '?' or '#': {value:?}"
        )));
    }
    Ok(())
}
