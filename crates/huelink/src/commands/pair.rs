use std::sync::Arc;

use huelink_core::{locate_bridge, pair_bridge};

use crate::cli::GlobalOpts;
use crate::commands::{load_with_overrides, resolved_config_path};
use crate::error::CliError;
use crate::host::CliHost;

/// Pair once and store both the address and the new credential.
pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let path = resolved_config_path(global);
    let cfg = load_with_overrides(global)?;
    let mut session_cfg = cfg.to_session_config();

    // Resolve first so the host saves address and credential in one write.
    let address = locate_bridge(&session_cfg).await?;
    session_cfg.address = Some(address.clone());
    let host = Arc::new(CliHost::new(path.clone(), false).with_address(address.as_str()));

    eprintln!("Press the link button on the bridge now if you have not already.");
    pair_bridge(&session_cfg, Arc::clone(&host) as Arc<dyn huelink_core::Host>).await?;
    if let Some(e) = host.take_save_error() {
        return Err(e.into());
    }

    eprintln!("Paired with {address}; credential saved to {}", path.display());
    Ok(())
}
