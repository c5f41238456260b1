use huelink_core::discover_bridges;

use crate::cli::GlobalOpts;
use crate::commands::load_with_overrides;
use crate::error::CliError;

/// One line per bridge: `<address>\t<id>`.
pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_with_overrides(global)?;
    let bridges = discover_bridges(&cfg.to_session_config()).await?;
    if bridges.is_empty() {
        return Err(CliError::DiscoveryFailed {
            reason: "the discovery service reported no bridges".into(),
        });
    }
    for bridge in bridges {
        println!("{}\t{}", bridge.address(), bridge.id.as_deref().unwrap_or("-"));
    }
    Ok(())
}
