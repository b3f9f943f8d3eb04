//! Presentation state for the generation screen.
//!
//! The poller owns the `watch::Sender`; the screen subscribes read-only.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::step::GenerationPhase;

/// Rotating progress phrases.
pub const PHRASES: &[&str] = &[
    "Reviewing your answers",
    "Matching foods to your triggers",
    "Balancing your daily routine",
    "Tailoring lifestyle recommendations",
    "Putting your program together",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationView {
    pub phase: GenerationPhase,
    /// Current workflow attempt, starting at 1.
    pub attempt: u32,
    pub phrase_index: usize,
    /// Whether the manual "force completion" button is shown.
    pub show_recovery: bool,
    /// Last user-visible error.
    pub error: Option<String>,
}

impl Default for GenerationView {
    fn default() -> Self {
        Self {
            phase: GenerationPhase::Starting,
            attempt: 0,
            phrase_index: 0,
            show_recovery: false,
            error: None,
        }
    }
}

impl GenerationView {
    pub fn phrase(&self) -> &'static str {
        PHRASES[self.phrase_index % PHRASES.len()]
    }
}

pub(crate) type ViewSender = Arc<watch::Sender<GenerationView>>;

/// Background tasks driving the animated parts of the view. Aborted on drop,
/// so tearing down a run never touches a disposed screen.
pub(crate) struct Tickers {
    handles: Vec<JoinHandle<()>>,
}

impl Tickers {
    pub(crate) fn start(
        view: &ViewSender,
        phrase_interval: Duration,
        recovery_reveal_after: Duration,
    ) -> Self {
        let mut handles = Vec::with_capacity(2);

        if !phrase_interval.is_zero() {
            let view = Arc::clone(view);
            handles.push(tokio::spawn(async move {
                let mut tick = tokio::time::interval(phrase_interval);
                // The first tick completes immediately.
                tick.tick().await;
                loop {
                    tick.tick().await;
                    view.send_modify(|v| v.phrase_index = (v.phrase_index + 1) % PHRASES.len());
                }
            }));
        }

        let view = Arc::clone(view);
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(recovery_reveal_after).await;
            view.send_modify(|v| v.show_recovery = true);
        }));

        Self { handles }
    }
}

impl Drop for Tickers {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_wraps() {
        let view = GenerationView {
            phrase_index: PHRASES.len() + 1,
            ..GenerationView::default()
        };
        assert_eq!(view.phrase(), PHRASES[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn tickers_rotate_and_reveal_then_stop_on_drop() {
        let (tx, rx) = watch::channel(GenerationView::default());
        let tx = Arc::new(tx);
        let tickers = Tickers::start(&tx, Duration::from_secs(1), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(rx.borrow().phrase_index, 2);
        assert!(!rx.borrow().show_recovery);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(rx.borrow().show_recovery);

        drop(tickers);
        let index = rx.borrow().phrase_index;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(rx.borrow().phrase_index, index);
    }
}
