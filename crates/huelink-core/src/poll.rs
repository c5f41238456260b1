// ── Poll scheduler ──
//
// One background task per session. Each tick fetches lights and groups
// concurrently, then publishes per device in bridge order, lights first.
// Cycles never overlap: the next tick is only awaited once the current
// cycle has published. A failed cycle is reported and the next tick
// retries from scratch.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use huelink_api::{BridgeClient, Category, DeviceCollection, RecordEntry};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::host::{Delta, Host, PathMeta, PathValue};
use crate::relay::{HandlerRegistry, Relay, WriteTarget};
use crate::status::StatusReporter;
use crate::translate::translate;

/// Counts from one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub lights: usize,
    pub groups: usize,
    /// Items the bridge flagged or that failed to decode.
    pub item_errors: usize,
    /// Collections that could not be fetched at all.
    pub fetch_errors: usize,
}

impl PollSummary {
    pub fn is_clean(&self) -> bool {
        self.item_errors == 0 && self.fetch_errors == 0
    }
}

pub(crate) struct Poller {
    client: Arc<BridgeClient>,
    host: Arc<dyn Host>,
    status: Arc<StatusReporter>,
    registry: Arc<HandlerRegistry>,
    relay: Arc<Relay>,
    /// Paths whose metadata has been delivered.
    meta_sent: DashSet<String>,
    address: String,
}

impl Poller {
    pub(crate) fn new(
        client: Arc<BridgeClient>,
        host: Arc<dyn Host>,
        status: Arc<StatusReporter>,
        registry: Arc<HandlerRegistry>,
        relay: Arc<Relay>,
        address: String,
    ) -> Self {
        Self {
            client,
            host,
            status,
            registry,
            relay,
            meta_sent: DashSet::new(),
            address,
        }
    }

    /// Run one full cycle.
    pub(crate) async fn poll_once(&self) -> PollSummary {
        let (lights, groups) = tokio::join!(
            self.client.fetch(Category::Lights),
            self.client.fetch(Category::Groups),
        );

        let mut summary = PollSummary::default();
        for (category, result) in [(Category::Lights, lights), (Category::Groups, groups)] {
            match result {
                Ok(collection) => self.apply(category, collection, &mut summary),
                Err(e) => {
                    summary.fetch_errors += 1;
                    warn!(%category, error = %e, "poll fetch failed");
                    self.status.error(format!("Failed to read {category}: {e}"));
                }
            }
        }

        if summary.is_clean() {
            self.status.info(format!(
                "Connected to bridge at {}: {} lights, {} groups",
                self.address, summary.lights, summary.groups
            ));
        }
        debug!(?summary, "poll cycle complete");
        summary
    }

    fn apply(&self, category: Category, collection: DeviceCollection, summary: &mut PollSummary) {
        let fold_meta = !self.host.supports_meta_deltas();

        for (id, entry) in collection {
            let record = match entry {
                RecordEntry::Device(record) => record,
                RecordEntry::Failed { description } => {
                    summary.item_errors += 1;
                    self.status
                        .error(format!("{category} {id}: {description}"));
                    continue;
                }
            };
            match category {
                Category::Lights => summary.lights += 1,
                Category::Groups => summary.groups += 1,
            }

            let translation = translate(category, &record);
            let mut values = translation.values;
            let mut meta = Vec::new();
            if fold_meta {
                values.push(PathValue::new(
                    format!("{}.meta", translation.path),
                    translation.meta,
                ));
            } else if self.meta_sent.insert(translation.path.clone()) {
                meta.push(PathMeta {
                    path: translation.path.clone(),
                    value: translation.meta,
                });
            }

            for attribute in translation.writable {
                let target = WriteTarget {
                    category,
                    id: id.clone(),
                    attribute,
                    path: format!("{}.{attribute}", translation.path),
                };
                self.registry.register(target, &self.relay, self.host.as_ref());
            }

            if !values.is_empty() || !meta.is_empty() {
                self.host.publish(Delta::new(values, meta));
            }
        }
    }
}

/// Poll immediately, then every `period` until `cancel` fires.
///
/// A cycle already in progress when `cancel` fires runs to completion.
pub(crate) async fn poll_task(poller: Arc<Poller>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                poller.poll_once().await;
            }
        }
    }
    debug!("poll task stopped");
}
