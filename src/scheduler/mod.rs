//! Fire-and-forget trigger for publishing runs.
//!
//! Each tick spawns a detached task and moves on. Nothing waits for the
//! previous run, so a slow run can overlap the next one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info};

use crate::publisher::{Outcome, Publisher};

/// Spawn one detached run. The handle is returned for tests; callers on the
/// trigger path drop it.
pub fn fire(publisher: Arc<Publisher>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match publisher.run_once().await {
            Ok(Outcome::Published { sign_id, uri }) => {
                info!(%sign_id, %uri, "scheduled run posted");
            }
            Ok(Outcome::Skipped(reason)) => {
                info!(%reason, "scheduled run skipped");
            }
            Err(e) => {
                error!("scheduled run failed: {e:#}");
            }
        }
    })
}

/// Ticks at a fixed period and fires a run on each tick.
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Tick until `shutdown` resolves. The first run fires one period from now.
    /// Returns the number of runs fired.
    pub async fn run<F>(&self, publisher: Arc<Publisher>, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(period_secs = self.period.as_secs(), "scheduler started");
        let mut fired = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    fired += 1;
                    let _ = fire(Arc::clone(&publisher));
                }
                _ = &mut shutdown => {
                    info!(fired, "scheduler stopped");
                    return fired;
                }
            }
        }
    }
}
