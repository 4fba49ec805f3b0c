mod cli;
mod error;
mod protocol;
mod server;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use unimcp_config::Overrides;
use unimcp_core::{ControllerConfig, Dispatcher, NetworkController, ToolRegistry};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::McpError;
use crate::server::Server;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries the protocol; logs go to stderr or a file
    let _guard = init_tracing(cli.global.verbose, cli.global.log_file.as_deref());

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return None;
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("unimcp.log"));

    let appender = tracing_appender::rolling::daily(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}

async fn run(cli: Cli) -> Result<(), McpError> {
    match cli.command.unwrap_or(Command::Serve) {
        // The catalogue is static; no controller needed
        Command::Tools => {
            let tools: Vec<_> = ToolRegistry::global().definitions().collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
            Ok(())
        }
        Command::Check => {
            let config = build_controller_config(&cli.global)?;
            check(&config).await
        }
        Command::Serve => {
            let config = build_controller_config(&cli.global)?;
            serve(config).await
        }
    }
}

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, McpError> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(unimcp_config::config_path);

    let cfg = unimcp_config::load_config_from(&path)
        .map_err(|e| McpError::from_config(e, &path))?;

    let overrides = Overrides {
        profile: global.profile.clone(),
        controller: global.controller.clone(),
        api_key: global.api_key.clone().map(SecretString::from),
        site: global.site.clone(),
        insecure: global.insecure,
        timeout: global.timeout,
    };

    unimcp_config::resolve_controller_config(&cfg, &overrides)
        .map_err(|e| McpError::from_config(e, &path))
}

async fn serve(config: ControllerConfig) -> Result<(), McpError> {
    let client = unimcp_core::connect(&config).await?;
    info!(controller = %config.url, platform = ?client.platform(), "controller client ready");

    let dispatcher = Dispatcher::new(Arc::new(client)).with_default_site(config.site);

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, shutting down");
            on_signal.cancel();
        }
    });

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Server::new(dispatcher, shutdown)
        .run(stdin, tokio::io::stdout())
        .await?;
    Ok(())
}

async fn check(config: &ControllerConfig) -> Result<(), McpError> {
    let client = unimcp_core::connect(config).await?;
    NetworkController::authenticate(&client).await?;
    let sites = client.get_sites().await?;

    info!(count = sites.len(), "controller reachable");
    println!("{}", serde_json::to_string_pretty(&sites)?);
    Ok(())
}
