//! Call command: send calls and print the decoded results.

use batchexecute_http::{BatchClient, BatchClientConfig, HttpSettings, ReqwestTransport};
use batchexecute_protocol::RpcCall;
use tracing::info;

use crate::error::{CliError, CliResult};

/// Sends `calls` to the configured endpoint and prints the results as JSON.
pub async fn run(
    config: BatchClientConfig,
    settings: HttpSettings,
    calls: &[RpcCall],
) -> CliResult<()> {
    info!(host = %config.host, app = %config.app, calls = calls.len(), "sending batch");

    let transport = ReqwestTransport::new(settings)?;
    let client = BatchClient::new(config, transport);
    let results = client.execute(calls).await?;

    let json = serde_json::to_string_pretty(&results)
        .map_err(|e| CliError::Input(format!("failed to render results: {}", e)))?;
    println!("{}", json);
    Ok(())
}
