//! batchexecute CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use batchexecute_cli::cli::{Cli, Command, ConfigAction};
use batchexecute_cli::commands;
use batchexecute_cli::config::CliConfig;
use batchexecute_cli::error::{CliError, CliResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration before tracing so `debug = true` in the file applies
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let filter = if cli.debug || config.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> CliResult<CliConfig> {
    match cli.config {
        Some(ref path) => CliConfig::load_from(path).map_err(CliError::Config),
        None => Ok(CliConfig::load().unwrap_or_default()),
    }
}

async fn run(cli: Cli, config: CliConfig) -> CliResult<()> {
    let host = cli.host.as_deref();
    let app = cli.app.as_deref();

    match cli.command {
        Command::Build { rpcs } => {
            let client_config = config.client_config(host, app)?;
            commands::build::run(&client_config, &rpcs)
        }
        Command::Decode {
            format,
            strict,
            expect,
            file,
        } => commands::decode::run(
            file.as_deref(),
            format.unwrap_or(config.decode.format),
            strict || config.decode.strict,
            &expect,
        ),
        Command::Call {
            rpcs,
            format,
            strict,
        } => {
            let client_config = config
                .client_config(host, app)?
                .with_response_format(format.unwrap_or(config.decode.format))
                .with_strict(strict || config.decode.strict);
            commands::call::run(client_config, config.http_settings(), &rpcs).await
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
