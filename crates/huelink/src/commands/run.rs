//! `huelink run`: stream deltas until Ctrl-C, relaying stdin writes.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use huelink_core::{PutOutcome, Session};

use crate::cli::{GlobalOpts, RunArgs};
use crate::commands::{load_with_overrides, resolved_config_path};
use crate::error::CliError;
use crate::host::CliHost;

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_with_overrides(global)?;
    let host = Arc::new(CliHost::new(resolved_config_path(global), args.inline_meta));

    let session = Session::start(cfg.to_session_config(), host).await?;
    info!(address = %session.address(), "session running, Ctrl-C to stop");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut writes: Vec<JoinHandle<()>> = Vec::new();

    loop {
        tokio::select! {
            biased;
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                }
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    writes.retain(|w| !w.is_finished());
                    writes.extend(spawn_relay(&session, &line));
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },
        }
    }

    session.stop().await;
    for write in writes {
        write.abort();
    }
    Ok(())
}

/// Parse `PUT <path> <json>`. A value that is not valid JSON is sent as a
/// string.
fn parse_put(line: &str) -> Option<(&str, Value)> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    if !parts.next()?.eq_ignore_ascii_case("put") {
        return None;
    }
    let path = parts.next().filter(|p| !p.is_empty())?;
    let raw = parts.next()?.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Some((path, value))
}

/// Relay one stdin line as a background write so the read loop keeps
/// servicing Ctrl-C and further lines while the bridge answers.
fn spawn_relay(session: &Session, line: &str) -> Option<JoinHandle<()>> {
    if line.trim().is_empty() {
        return None;
    }
    let Some((path, value)) = parse_put(line) else {
        warn!(%line, "expected: PUT <path> <json>");
        return None;
    };
    let path = path.to_owned();
    let session = session.clone();
    Some(tokio::spawn(async move {
        match session.put(&path, value).await {
            PutOutcome::Success => info!(%path, "write confirmed"),
            PutOutcome::Failure { message } => warn!(%path, %message, "write failed"),
        }
    }))
}
