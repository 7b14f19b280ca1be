//! Configuration commands.

use batchexecute_protocol::ResponseFormat;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &CliConfig) -> CliResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", CliConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &CliConfig) -> CliResult<()> {
    check(config)?;
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> CliResult<()> {
    let config_path = CliConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}

fn check(config: &CliConfig) -> CliResult<()> {
    for (name, value) in [("host", &config.target.host), ("app", &config.target.app)] {
        if let Some(value) = value {
            if value.is_empty() || value.contains(['/', '?', '#']) {
                return Err(CliError::Config(format!("invalid target {}: {:?}", name, value)));
            }
        }
    }

    if config.decode.format == ResponseFormat::Protobuf {
        return Err(CliError::Config(
            "protobuf responses cannot be decoded; use \"default\" or \"compressed\"".into(),
        ));
    }

    if config.http.timeout == 0 {
        return Err(CliError::Config("http timeout must be greater than 0".into()));
    }

    Ok(())
}
