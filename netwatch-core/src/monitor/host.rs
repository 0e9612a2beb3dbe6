//! Per-host reachability monitoring with debounced reporting
//!
//! One monitor owns one probe and notifies the sink exactly when the
//! reading flips relative to the last reported state.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::monitor::probe::ReachabilityProbe;
use crate::monitor::sink::EventSink;
use crate::types::{EntityId, LinkState, SharedLinkState};

/// Delay before the first probe read, letting the ping process settle
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Pause after a failed read or spawn before the loop continues
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Reachability monitor for one address
///
/// A monitor without an id runs privately (a VPN's tunnel-liveness probe)
/// and never notifies the sink; its shared state is still updated so the
/// owning controller can poll it.
pub struct HostMonitor {
    id: Option<EntityId>,
    address: String,
    state: SharedLinkState,
}

impl HostMonitor {
    /// Create a monitor for `address`
    pub fn new(id: Option<EntityId>, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
            state: SharedLinkState::new(),
        }
    }

    /// Handle to the latest reported state, shared with other tasks
    ///
    /// Callers take this handle during wiring, before the monitor task
    /// is spawned.
    pub fn state(&self) -> SharedLinkState {
        self.state.clone()
    }

    /// Address this monitor probes
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Run the monitor loop until process exit
    ///
    /// A failed read is logged and swallowed; monitoring must never
    /// terminate on a transient probe error.
    pub async fn run(mut self, sink: Arc<dyn EventSink>) {
        let mut probe = loop {
            match ReachabilityProbe::spawn(&self.address) {
                Ok(probe) => break probe,
                Err(e) => {
                    debug!(address = %self.address, error = %e, "probe spawn failed, retrying");
                    sleep(RETRY_DELAY).await;
                }
            }
        };

        sleep(SETTLE_DELAY).await;

        loop {
            match probe.read_next().await {
                Ok(reachable) => self.observe(reachable, sink.as_ref()),
                Err(e) => {
                    debug!(address = %self.address, error = %e, "probe read failed, continuing");
                    sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    /// Record one reading, notifying the sink only on a transition
    fn observe(&mut self, reachable: bool, sink: &dyn EventSink) {
        let reading = LinkState::from_reading(reachable);
        if reading == self.state.get() {
            return;
        }
        if let Some(id) = &self.id {
            sink.notify(id, reading);
        }
        self.state.set(reading);
    }
}
