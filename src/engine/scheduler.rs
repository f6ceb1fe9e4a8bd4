use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::engine::lifecycle::Lifecycle;

/// Background sweep and sync loops.
///
/// The first tick of a tokio interval completes immediately, so both jobs run once at start. A
/// job awaits its own run before waiting for the next tick and therefore never overlaps itself.
/// Tasks are aborted on [`Scheduler::shutdown`] or when the scheduler is dropped.
pub struct Scheduler {
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn start(
        lifecycle: Arc<Lifecycle>,
        sync_every: Duration,
        cleanup_every: Duration,
    ) -> Scheduler {
        let sweeper = lifecycle.clone();
        let cleanup = tokio::spawn(async move {
            let mut ticks = interval(cleanup_every);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                sweeper.cleanup().await;
            }
        });

        let sync = tokio::spawn(async move {
            let mut ticks = interval(sync_every);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let report = lifecycle.sync().await;
                info!(
                    "Scheduled sync finished: {} fetched, {} new matches",
                    report.fetched, report.reconciled.inserted
                );
            }
        });

        info!(
            "Scheduler started: sync every {:?}, cleanup every {:?}",
            sync_every, cleanup_every
        );
        Scheduler {
            tasks: vec![cleanup, sync],
        }
    }

    pub fn shutdown(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        info!("Scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
