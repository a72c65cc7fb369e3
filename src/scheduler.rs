use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::config::MonitorConfig;
use crate::monitor::PriceMonitor;

/// Runs reconciliation passes on a fixed interval until told to stop.
///
/// The first pass starts immediately; later ones wait out the full interval.
/// A pass that overruns its slot delays the next tick instead of stacking
/// catch-up passes behind it.
pub struct MonitorLoop {
    monitor: Arc<PriceMonitor>,
    interval: Duration,
}

/// Handle to a spawned loop. Dropping it without calling `shutdown` leaves
/// the loop running for the life of the runtime.
pub struct MonitorHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorLoop {
    pub fn new(monitor: Arc<PriceMonitor>, config: &MonitorConfig) -> Self {
        Self {
            monitor,
            interval: Duration::from_secs(config.check_interval),
        }
    }

    pub fn spawn(self) -> MonitorHandle {
        let (stop, mut stopped) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = self.interval.as_secs(), "monitor loop started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.monitor.run_pass().await {
                            error!(error = %e, "reconciliation pass failed");
                        }
                    }
                    _ = stopped.changed() => {
                        info!("monitor loop stopped");
                        break;
                    }
                }
            }
        });

        MonitorHandle { stop, task }
    }
}

impl MonitorHandle {
    /// Signals the loop to stop and waits for the in-flight pass to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "monitor loop task did not shut down cleanly");
        }
    }
}
