//! Readiness monitor.
//!
//! Sends run with a capability only once one is known to be present, so the
//! session starts gated. A single task probes the capability slot on a fixed
//! interval and, failing that, forces readiness at a deadline so the offline
//! demo path still works. Either way exactly one `Ready` event is emitted.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::capability::CapabilitySlot;
use crate::tui::AppEvent;

pub const PROBE_INTERVAL: Duration = Duration::from_millis(300);
pub const FORCED_READY_AFTER: Duration = Duration::from_millis(1000);

/// Handle to the monitor task. Dropping it aborts the task, cancelling both
/// the probe interval and the forced-ready deadline.
pub struct ReadinessMonitor {
    handle: JoinHandle<()>,
}

impl ReadinessMonitor {
    pub fn spawn(slot: CapabilitySlot, events: UnboundedSender<AppEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let forced = tokio::time::sleep(FORCED_READY_AFTER);
            tokio::pin!(forced);
            let mut probe = tokio::time::interval(PROBE_INTERVAL);
            // The first interval tick fires immediately; a capability
            // installed before startup is detected without waiting.
            loop {
                tokio::select! {
                    _ = probe.tick() => {
                        if slot.is_present() {
                            break;
                        }
                    }
                    _ = &mut forced => break,
                }
            }
            let _ = events.send(AppEvent::Ready);
        });
        Self { handle }
    }
}

impl Drop for ReadinessMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
