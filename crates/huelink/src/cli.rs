//! Clap derive structures for the `huelink` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// huelink -- bridge Philips Hue lights onto a JSON delta stream
#[derive(Debug, Parser)]
#[command(
    name = "huelink",
    version,
    about = "Poll a Philips Hue bridge and relay light commands",
    long_about = "Runs a Hue bridge session: discovers or connects to the bridge,\n\
        pairs when no credential is stored, then prints every light and group\n\
        change as one JSON delta per line on stdout.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HUELINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Bridge address (overrides config; skips discovery)
    #[arg(long, short = 'a', global = true)]
    pub address: Option<String>,

    /// Discovery service URL (overrides config)
    #[arg(long, global = true)]
    pub discovery_url: Option<String>,

    /// Poll interval in seconds (overrides config)
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a session, printing deltas as JSON lines
    ///
    /// Write to a light by sending `PUT <path> <json>` on stdin, e.g.
    /// `PUT electrical.switches.lights.desk.dimmingLevel 0.5`.
    Run(RunArgs),

    /// List bridges reported by the discovery service
    Discover,

    /// Pair with the bridge and store the credential
    Pair,

    /// Print the configuration schema
    Schema,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Fold metadata into each batch as `{path}.meta` values
    #[arg(long)]
    pub inline_meta: bool,
}
