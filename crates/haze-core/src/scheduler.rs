//! Recurring backfill scheduler.
//!
//! An explicit component configured at startup with an injected callback,
//! rather than ambient global timer state. The callback owns its own error
//! handling; failures never stop the schedule.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Fires an injected async job on a fixed cadence.
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Spawn the schedule loop. The first run fires immediately, then every
    /// `interval`. Returns a handle used to stop the loop.
    pub fn spawn<F, Fut>(self, job: F) -> SchedulerHandle
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A long-running job must not cause a burst of catch-up runs
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tracing::debug!("Scheduler tick");
                        job().await;
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("Scheduler stopping");
                        break;
                    }
                }
            }
        });

        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running schedule loop.
pub struct SchedulerHandle {
    shutdown: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for it to exit. A job already in progress
    /// finishes first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(()).await;
        let _ = self.task.await;
    }
}
