//! Periodic cycle-status watcher.
//!
//! Runs [`RoutingEngine::check_cycle`] on an interval and forwards decisions
//! that require navigation. Checks that overlap with a manual check on the
//! welcome screen are collapsed by the engine's in-flight guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::engine::RoutingEngine;
use super::state::CycleDecision;

/// Decisions buffered before the watcher waits on the receiver.
const DECISION_CHANNEL_CAPACITY: usize = 8;

/// Floor for the check interval; `tokio::time::interval` rejects zero.
const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the watcher. Returns its handle, a shutdown flag, and the stream
/// of navigation-worthy decisions. The watcher also stops once the receiver
/// is dropped.
pub fn spawn_cycle_watch(
    engine: Arc<RoutingEngine>,
    every: Duration,
) -> (JoinHandle<()>, Arc<AtomicBool>, mpsc::Receiver<CycleDecision>) {
    let every = every.max(MIN_CHECK_INTERVAL);
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);
    let (tx, rx) = mpsc::channel(DECISION_CHANNEL_CAPACITY);

    let handle = tokio::spawn(async move {
        info!("Cycle watcher started, checking every {}s", every.as_secs());

        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tick.tick().await;

            if shutdown.load(Ordering::Relaxed) {
                info!("Cycle watcher shutting down");
                return;
            }

            let decision = engine.check_cycle().await;
            if decision.screen().is_none() {
                debug!(decision = ?decision, "Cycle check needs no navigation");
                continue;
            }
            let stop_after = matches!(decision, CycleDecision::Unauthenticated);
            if tx.send(decision).await.is_err() {
                info!("Cycle watcher receiver dropped; stopping");
                return;
            }
            if stop_after {
                info!("Session ended; cycle watcher stopping");
                return;
            }
        }
    });

    (handle, shutdown_flag, rx)
}
