//! # engine::scheduler
//!
//! **Refresh Scheduler** — one task that drives the pipeline:
//!
//! * refresh immediately on start, then every `period`
//! * manual reload refreshes now and restarts the period from that moment
//! * a runtime counter ticks once per second and restarts at zero on reload
//! * shutdown cancels every timer; a refresh already in flight finishes its
//!   requests but its result is thrown away
//!
//! ```text
//! select! ─┬─ shutdown.changed()   → exit
//!          ├─ refresh_ticker       → cycle(scheduled)
//!          ├─ reload_rx.recv()     → reset timers, runtime = 0, cycle(manual)
//!          └─ runtime_ticker       → runtime += 1
//! ```
//!
//! There is no retry or backoff: a failed cycle waits for the next tick or a
//! manual reload.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::engine::pipeline::ReconciliationPipeline;
use crate::events::WsEvent;

const RUNTIME_TICK: Duration = Duration::from_secs(1);

// ─── Handle ───────────────────────────────────────────────────────────────────

/// Owner-side control of a running scheduler. Dropping it tears the task down.
pub struct SchedulerHandle {
    reload_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
    runtime_secs: Arc<AtomicU64>,
    /// Taken by the first `stop`.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulerHandle {
    /// Request a manual reload. Reloads requested while one is already queued
    /// collapse into it; returns `false` in that case.
    pub fn trigger_reload(&self) -> bool {
        self.reload_tx.try_send(()).is_ok()
    }

    /// Seconds since start or since the last manual reload.
    pub fn runtime_secs(&self) -> u64 {
        self.runtime_secs.load(Ordering::Relaxed)
    }

    /// Stop the scheduler. No refresh fires afterwards.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        match self.task.try_lock() {
            Ok(task) => task.as_ref().map_or(true, JoinHandle::is_finished),
            Err(_) => false,
        }
    }

    /// Shut down and wait for the task to exit, including any refresh that
    /// was in flight. Later calls return immediately.
    pub async fn stop(&self) {
        self.shutdown();
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(error = %e, "refresh scheduler task panicked");
            }
        }
    }
}

// ─── Spawn ────────────────────────────────────────────────────────────────────

pub fn spawn(
    pipeline: Arc<ReconciliationPipeline>,
    period: Duration,
    events: broadcast::Sender<String>,
) -> SchedulerHandle {
    let (reload_tx, reload_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runtime_secs = Arc::new(AtomicU64::new(0));

    let task = tokio::spawn(run(
        pipeline,
        period,
        reload_rx,
        shutdown_rx,
        Arc::clone(&runtime_secs),
        events,
    ));

    SchedulerHandle {
        reload_tx,
        shutdown_tx,
        runtime_secs,
        task: Mutex::new(Some(task)),
    }
}

async fn run(
    pipeline: Arc<ReconciliationPipeline>,
    period: Duration,
    mut reload_rx: mpsc::Receiver<()>,
    mut shutdown_rx: watch::Receiver<bool>,
    runtime_secs: Arc<AtomicU64>,
    events: broadcast::Sender<String>,
) {
    // First tick completes immediately: that is the refresh on activation.
    let mut refresh_ticker = interval(period);
    refresh_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Burst (the default) so the counter catches up after a slow refresh.
    let mut runtime_ticker = interval_at(Instant::now() + RUNTIME_TICK, RUNTIME_TICK);

    info!(every_secs = period.as_secs(), "refresh scheduler started");

    loop {
        let manual = tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
                continue;
            }

            Some(()) = reload_rx.recv() => {
                refresh_ticker.reset();
                runtime_ticker.reset();
                runtime_secs.store(0, Ordering::Relaxed);
                true
            }

            _ = refresh_ticker.tick() => false,

            _ = runtime_ticker.tick() => {
                runtime_secs.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        };

        debug!(manual, "refresh cycle starting");
        let pending = pipeline.fetch().await;

        if is_shut_down(&shutdown_rx) {
            pipeline.abandon(pending).await;
            break;
        }

        let event = match pipeline.apply(pending).await {
            Ok(report) => WsEvent::ItemsRefreshed { report, manual },
            Err(err) => WsEvent::RefreshFailed {
                error: format!("Could not fetch data: {err}"),
                manual,
            },
        };
        // Err only means nobody is listening.
        let _ = events.send(event.to_json());
    }

    info!("refresh scheduler stopped");
}

fn is_shut_down(rx: &watch::Receiver<bool>) -> bool {
    *rx.borrow() || rx.has_changed().is_err()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
