//! Clap derive structures for the `unimcp` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unimcp -- MCP tool server for UniFi Network controllers
#[derive(Debug, Parser)]
#[command(
    name = "unimcp",
    version,
    about = "Serve UniFi Network controller tools over MCP (JSON-RPC on stdio)",
    long_about = "Exposes sites, devices, WiFi, clients, firewall, ACL, vouchers,\n\
        traffic rules, VPN, RADIUS and DPI data of a UniFi Network controller\n\
        as MCP tools. With no subcommand, runs the stdio server.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNIFI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "UNIFI_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Default site (name, short name or UUID) for calls without site_id
    #[arg(long, short = 's', env = "UNIFI_SITE", global = true)]
    pub site: Option<String>,

    /// Integration API key
    #[arg(long, env = "UNIFI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNIFI_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "UNIFI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to a daily-rolling file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Run the MCP server on stdin/stdout (default)
    Serve,

    /// Print the tool catalogue as JSON
    Tools,

    /// Authenticate against the controller and list its sites
    Check,
}
