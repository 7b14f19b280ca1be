//! Command-line interface definition.

use std::path::PathBuf;

use batchexecute_protocol::{ResponseFormat, RpcCall};
use clap::{Parser, Subcommand};

/// batchexecute - build, send and decode multiplexed RPC batches
#[derive(Debug, Parser)]
#[command(name = "batchexecute")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "BATCHEXECUTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Target host (overrides the config file)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Application name (overrides the config file)
    #[arg(long, global = true)]
    pub app: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the request for the given calls without sending it
    Build {
        /// Call as ID=JSON_ARGS (can be repeated, order is kept)
        #[arg(long = "rpc", value_name = "ID=ARGS", required = true, value_parser = parse_rpc_call)]
        rpcs: Vec<RpcCall>,
    },

    /// Decode a raw response read from a file or stdin
    Decode {
        /// Response format: default, compressed (c) or protobuf (b)
        #[arg(long, value_parser = parse_format)]
        format: Option<ResponseFormat>,

        /// Reject null payloads and check returned rpc ids
        #[arg(long)]
        strict: bool,

        /// Expected rpc id for strict decoding (can be repeated)
        #[arg(long = "expect", value_name = "ID")]
        expect: Vec<String>,

        /// File containing the raw response (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Send the given calls and print the decoded results
    Call {
        /// Call as ID=JSON_ARGS (can be repeated, order is kept)
        #[arg(long = "rpc", value_name = "ID=ARGS", required = true, value_parser = parse_rpc_call)]
        rpcs: Vec<RpcCall>,

        /// Response format: default, compressed (c) or protobuf (b)
        #[arg(long, value_parser = parse_format)]
        format: Option<ResponseFormat>,

        /// Reject null payloads and check returned rpc ids
        #[arg(long)]
        strict: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

/// Parses `ID=ARGS` into a call, checking that `ARGS` is JSON.
pub fn parse_rpc_call(s: &str) -> Result<RpcCall, String> {
    let (id, args) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=ARGS, got {:?}", s))?;
    if id.is_empty() {
        return Err("rpc id must not be empty".to_string());
    }
    serde_json::from_str::<serde_json::Value>(args)
        .map_err(|e| format!("arguments of {} are not valid JSON: {}", id, e))?;
    Ok(RpcCall::new(id, args))
}

/// Parses a response format by name or wire tag.
pub fn parse_format(s: &str) -> Result<ResponseFormat, String> {
    match s {
        "default" => Ok(ResponseFormat::Default),
        "compressed" => Ok(ResponseFormat::Compressed),
        "protobuf" => Ok(ResponseFormat::Protobuf),
        tag => tag.parse().map_err(|e| format!("{}", e)),
    }
}
