//! Build command: print a request without sending it.

use batchexecute_http::{BatchClientConfig, HttpRequest, prepare_request};
use batchexecute_protocol::{RandomReqId, ReqIdSource, RpcCall};

use crate::error::CliResult;

/// Prints the request for `calls`.
pub fn run(config: &BatchClientConfig, calls: &[RpcCall]) -> CliResult<()> {
    print!("{}", render_calls(config, calls, &RandomReqId)?);
    Ok(())
}

/// Builds the request for `calls` and renders it as text.
pub fn render_calls(
    config: &BatchClientConfig,
    calls: &[RpcCall],
    req_ids: &dyn ReqIdSource,
) -> CliResult<String> {
    let request = prepare_request(config, calls, req_ids)?;
    Ok(render(&request))
}

/// Renders a request as `POST url`, headers, a blank line and the body.
pub fn render(request: &HttpRequest) -> String {
    let mut out = format!("POST {}\n", request.url);
    for (name, value) in &request.headers {
        out.push_str(&format!("{}: {}\n", name, value));
    }
    out.push('\n');
    out.push_str(&request.body);
    out.push('\n');
    out
}
