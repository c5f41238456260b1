//! Subcommand handlers.

mod discover;
mod pair;
mod run;
mod schema;

use std::path::PathBuf;

use huelink_config::{PluginConfig, config_path, load_config};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    tracing::debug!(command = ?cli.command, "dispatching command");
    match cli.command {
        Command::Schema => schema::handle(),
        Command::Discover => discover::handle(&cli.global).await,
        Command::Pair => pair::handle(&cli.global).await,
        Command::Run(args) => run::handle(args, &cli.global).await,
    }
}

pub(crate) fn resolved_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Config file plus environment, then CLI flag overrides.
pub(crate) fn load_with_overrides(global: &GlobalOpts) -> Result<PluginConfig, CliError> {
    let mut cfg = load_config(&resolved_config_path(global))?;
    if let Some(address) = &global.address {
        cfg.address = Some(address.clone());
    }
    if let Some(url) = &global.discovery_url {
        cfg.discovery_url.clone_from(url);
    }
    if let Some(secs) = global.poll_interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "poll-interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        cfg.poll_interval_secs = secs;
    }
    cfg.validate()?;
    Ok(cfg)
}
