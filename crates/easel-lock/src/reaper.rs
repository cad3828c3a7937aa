//! Expiry reaper
//!
//! Periodic sweep of expired lock rows. Correctness does not depend on it
//! (reads and acquires treat expired rows as absent on their own); the
//! reaper keeps the table from accumulating dead leases. Sweep failures are
//! logged and retried on the next tick, never fatal.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::service::LockService;

pub struct Reaper {
    service: LockService,
    interval: Duration,
}

impl Reaper {
    pub fn new(service: LockService) -> Self {
        let interval = service.config().reaper_interval;
        Self { service, interval }
    }

    /// Spawn the sweep loop. The first tick fires immediately, so leftovers
    /// from a previous process are cleared at startup. Stops when the
    /// shutdown channel fires.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = self.interval.as_secs(), "expiry reaper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match self.service.sweep_expired().await {
                            Ok(0) => {}
                            Ok(deleted) => info!(deleted, "reaper removed expired locks"),
                            Err(err) => warn!(error = %err, "reaper sweep failed"),
                        }
                    }
                    _ = shutdown.recv() => {
                        info!("expiry reaper stopping");
                        break;
                    }
                }
            }
        })
    }
}
