//! GenerationPoller: runs the workflow with retries, a safety ceiling, a
//! minimum display time, and a manual escape hatch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::api::{CompanionApi, Program};
use crate::config::GenerationConfig;
use crate::onboarding::{OnboardingProgress, OnboardingScreen};
use crate::store::Session;

use super::step::{CompletionError, GenerationOutcome, GenerationPhase, HardFailure, StepOutcome};
use super::view::{GenerationView, Tickers, ViewSender};
use super::workflow::Workflow;

/// Upper bound on the finalize call made by a forced completion.
const FORCE_FINALIZE_TIMEOUT: Duration = Duration::from_secs(3);

/// Fires the manual "force completion" path.
pub struct ForceTrigger(oneshot::Sender<()>);

impl ForceTrigger {
    /// Returns false if the run already finished.
    pub fn fire(self) -> bool {
        self.0.send(()).is_ok()
    }
}

/// Waited on by a run; resolves when the paired trigger fires.
pub struct ForceSignal(Option<oneshot::Receiver<()>>);

impl ForceSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self(None)
    }

    async fn fired(self) {
        if let Some(rx) = self.0 {
            if rx.await.is_ok() {
                return;
            }
        }
        // Dropped trigger or no trigger at all: never fires.
        std::future::pending::<()>().await
    }
}

pub fn force_channel() -> (ForceTrigger, ForceSignal) {
    let (tx, rx) = oneshot::channel();
    (ForceTrigger(tx), ForceSignal(Some(rx)))
}

pub struct GenerationPoller {
    api: Arc<dyn CompanionApi>,
    progress: OnboardingProgress,
    workflow: Workflow,
    config: GenerationConfig,
    view: ViewSender,
}

impl GenerationPoller {
    pub fn new(api: Arc<dyn CompanionApi>, session: Session, config: GenerationConfig) -> Self {
        let progress = OnboardingProgress::new(session.clone());
        let (view, _) = watch::channel(GenerationView::default());
        let view = Arc::new(view);
        let workflow = Workflow::new(
            Arc::clone(&api),
            session,
            progress.clone(),
            Arc::clone(&view),
        );
        Self {
            api,
            progress,
            workflow,
            config,
            view,
        }
    }

    /// Read-only presentation state.
    pub fn subscribe(&self) -> watch::Receiver<GenerationView> {
        self.view.subscribe()
    }

    /// Step 3 on its own: fetch the program, generating only on 404.
    pub async fn fetch_or_generate_program(&self) -> Option<Program> {
        match self.workflow.fetch_or_generate_program().await {
            StepOutcome::Success(program) => Some(program),
            _ => None,
        }
    }

    /// Run to a terminal outcome.
    ///
    /// Three things race: the retried workflow (padded to the minimum
    /// display time), the safety ceiling, and the force signal. Whichever
    /// finishes first decides the outcome; the others are dropped.
    pub async fn run(&self, force: ForceSignal) -> GenerationOutcome {
        let started = Instant::now();
        self.progress.advance_to(OnboardingScreen::Generating).await;
        let _tickers = Tickers::start(
            &self.view,
            self.config.phrase_interval,
            self.config.recovery_reveal_after,
        );

        let work = async {
            let outcome = self.run_with_retries().await;
            if !matches!(outcome, GenerationOutcome::Unauthenticated) {
                tokio::time::sleep_until(started + self.config.min_display).await;
            }
            outcome
        };

        let outcome = tokio::select! {
            outcome = work => outcome,
            _ = tokio::time::sleep_until(started + self.config.ceiling) => {
                warn!(
                    ceiling_secs = self.config.ceiling.as_secs(),
                    "Generation safety timeout elapsed; proceeding to program"
                );
                GenerationOutcome::CompletedWithError(CompletionError::TimedOut)
            }
            _ = force.fired() => self.force_complete().await,
        };

        self.view.send_modify(|v| v.phase = GenerationPhase::Finished);
        match &outcome {
            GenerationOutcome::Completed(program) => {
                info!(
                    program_id = program.id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Generation completed"
                );
            }
            GenerationOutcome::CompletedWithError(e) => {
                warn!(error = %e, "Generation completed with error");
            }
            GenerationOutcome::Unauthenticated => {
                warn!("Generation aborted: session missing");
            }
        }
        outcome
    }

    async fn run_with_retries(&self) -> GenerationOutcome {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            self.view.send_modify(|v| v.attempt = attempt);
            match self.workflow.run().await {
                Ok(report) => {
                    return match report.program {
                        Some(program) => {
                            if !report.failures.is_empty() {
                                info!(
                                    soft_failures = report.failures.len(),
                                    "Program ready with degraded enrichment"
                                );
                            }
                            GenerationOutcome::Completed(program)
                        }
                        None => {
                            let reason = report
                                .user_error()
                                .map(str::to_string)
                                .unwrap_or_else(|| "no program returned".to_string());
                            GenerationOutcome::CompletedWithError(
                                CompletionError::ProgramUnavailable(reason),
                            )
                        }
                    };
                }
                Err(HardFailure::Unauthenticated) => return GenerationOutcome::Unauthenticated,
                Err(HardFailure::Retryable(reason)) => {
                    warn!(attempt, max_attempts, reason = %reason, "Generation attempt failed");
                    last_error = reason;
                    if attempt < max_attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        error!(attempts = max_attempts, last_error = %last_error, "Generation retries exhausted");
        GenerationOutcome::CompletedWithError(CompletionError::RetriesExhausted {
            attempts: max_attempts,
            last_error,
        })
    }

    /// Manual escape hatch: mark onboarding complete and leave immediately.
    async fn force_complete(&self) -> GenerationOutcome {
        info!("Generation force-completed by user");
        match tokio::time::timeout(FORCE_FINALIZE_TIMEOUT, self.api.complete_onboarding()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Finalize-onboarding call failed during forced completion");
            }
            Err(_) => {
                warn!(
                    timeout_secs = FORCE_FINALIZE_TIMEOUT.as_secs(),
                    "Finalize-onboarding call timed out during forced completion"
                );
            }
        }
        self.progress.clear().await;
        GenerationOutcome::CompletedWithError(CompletionError::Forced)
    }

    /// Run on a background task.
    pub fn spawn(self: Arc<Self>) -> GenerationHandle {
        let (trigger, signal) = force_channel();
        let view = self.subscribe();
        let task = tokio::spawn(async move { self.run(signal).await });
        GenerationHandle {
            task: Some(task),
            force: Some(trigger),
            view,
        }
    }
}

/// Handle to a spawned run. Dropping it cancels the run.
pub struct GenerationHandle {
    task: Option<JoinHandle<GenerationOutcome>>,
    force: Option<ForceTrigger>,
    view: watch::Receiver<GenerationView>,
}

impl GenerationHandle {
    pub fn subscribe(&self) -> watch::Receiver<GenerationView> {
        self.view.clone()
    }

    /// Trigger forced completion. Only the first call has an effect.
    pub fn force_complete(&mut self) -> bool {
        self.force.take().is_some_and(ForceTrigger::fire)
    }

    /// Cancel the run (screen unmounted).
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Wait for the outcome. `None` if the task was cancelled or panicked.
    pub async fn outcome(mut self) -> Option<GenerationOutcome> {
        let task = self.task.take()?;
        match task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Generation task did not complete");
                None
            }
        }
    }
}

impl Drop for GenerationHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
