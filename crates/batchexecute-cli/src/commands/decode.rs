//! Decode command: decode a raw response from a file or stdin.

use std::io::Read;
use std::path::Path;

use batchexecute_protocol::{ResponseFormat, decode};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Reads the raw response from `file` (or stdin) and prints the results.
pub fn run(
    file: Option<&Path>,
    format: ResponseFormat,
    strict: bool,
    expect: &[String],
) -> CliResult<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };
    debug!(bytes = raw.len(), %format, strict, "decoding response");

    println!("{}", decode_to_json(&raw, format, strict, expect)?);
    Ok(())
}

/// Decodes `raw` and renders the results as pretty JSON.
pub fn decode_to_json(
    raw: &str,
    format: ResponseFormat,
    strict: bool,
    expect: &[String],
) -> CliResult<String> {
    if strict && expect.is_empty() {
        return Err(CliError::Input(
            "strict decoding needs at least one --expect".to_string(),
        ));
    }
    let results = decode(raw, format, strict, expect)?;
    serde_json::to_string_pretty(&results)
        .map_err(|e| CliError::Input(format!("failed to render results: {}", e)))
}
