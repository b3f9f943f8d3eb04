//! The generation workflow: six strictly sequential steps.
//!
//! 1. confirm the onboarding-complete flag
//! 2. ensure an active cycle
//! 3. fetch the program, generating it on 404
//! 4. regenerate recommendations
//! 5. finalize cycle setup with the latest questionnaire scores
//! 6. clear the onboarding progress marker
//!
//! Only step 1 errors and a missing or rejected token end an attempt; every
//! other failure is recorded and the workflow moves on.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{CompanionApi, CompleteSetupRequest, CompletionScores, Cycle, Program};
use crate::error::ApiError;
use crate::onboarding::OnboardingProgress;
use crate::store::Session;

use super::step::{GenerationPhase, HardFailure, StepFailure, StepOutcome};
use super::view::ViewSender;

/// Everything an attempt produced, including soft failures.
#[derive(Debug, Default)]
pub struct WorkflowReport {
    pub onboarding_confirmed: bool,
    pub cycle: Option<Cycle>,
    pub program: Option<Program>,
    pub failures: Vec<StepFailure>,
}

impl WorkflowReport {
    /// The error to show the user, if any step recorded one.
    pub fn user_error(&self) -> Option<&str> {
        self.failures
            .iter()
            .rev()
            .find_map(|f| f.user_message.as_deref())
    }

    fn record(&mut self, failure: StepFailure) {
        warn!(
            phase = %failure.phase,
            reason = %failure.reason,
            "Generation step failed; continuing"
        );
        self.failures.push(failure);
    }
}

pub struct Workflow {
    api: Arc<dyn CompanionApi>,
    session: Session,
    progress: OnboardingProgress,
    view: ViewSender,
}

impl Workflow {
    pub(crate) fn new(
        api: Arc<dyn CompanionApi>,
        session: Session,
        progress: OnboardingProgress,
        view: ViewSender,
    ) -> Self {
        Self {
            api,
            session,
            progress,
            view,
        }
    }

    fn enter(&self, phase: GenerationPhase) {
        debug!(phase = %phase, "Generation phase");
        self.view.send_modify(|v| v.phase = phase);
    }

    /// Run one attempt of steps 1–6.
    pub async fn run(&self) -> Result<WorkflowReport, HardFailure> {
        let mut report = WorkflowReport::default();

        if !self.session.has_token().await {
            warn!("Auth token missing at generation start; aborting to login");
            return Err(HardFailure::Unauthenticated);
        }

        self.enter(GenerationPhase::VerifyingProfile);
        match self.verify_profile().await {
            StepOutcome::Success(confirmed) => report.onboarding_confirmed = confirmed,
            StepOutcome::SoftFailure(f) => report.record(f),
            StepOutcome::HardFailure(e) => return Err(e),
        }

        self.enter(GenerationPhase::EnsuringCycle);
        match self.ensure_cycle().await {
            StepOutcome::Success(cycle) => report.cycle = Some(cycle),
            StepOutcome::SoftFailure(f) => report.record(f),
            StepOutcome::HardFailure(e) => return Err(e),
        }

        self.enter(GenerationPhase::FetchingProgram);
        match self.fetch_or_generate_program().await {
            StepOutcome::Success(program) => report.program = Some(program),
            StepOutcome::SoftFailure(f) => {
                if let Some(message) = &f.user_message {
                    let message = message.clone();
                    self.view.send_modify(|v| v.error = Some(message));
                }
                report.record(f);
            }
            StepOutcome::HardFailure(e) => return Err(e),
        }

        self.enter(GenerationPhase::RegeneratingRecommendations);
        if let StepOutcome::SoftFailure(f) = self.regenerate_recommendations().await {
            report.record(f);
        }

        self.enter(GenerationPhase::FinalizingCycle);
        if let StepOutcome::SoftFailure(f) = self.finalize_cycle(report.program.as_ref()).await {
            report.record(f);
        }

        self.enter(GenerationPhase::ClearingProgress);
        if let StepOutcome::SoftFailure(f) = self.clear_progress().await {
            report.record(f);
        }

        Ok(report)
    }

    /// Step 1. A false flag is only logged; a failed call ends the attempt.
    async fn verify_profile(&self) -> StepOutcome<bool> {
        match self.api.get_profile().await {
            Ok(profile) => {
                if !profile.onboarding_complete {
                    warn!("Profile does not report onboarding complete; generating anyway");
                }
                StepOutcome::Success(profile.onboarding_complete)
            }
            Err(e) if e.is_unauthorized() => rejected(&e),
            Err(e) => StepOutcome::HardFailure(HardFailure::Retryable(format!(
                "profile check failed: {e}"
            ))),
        }
    }

    /// Step 2. Creates a cycle when none is active.
    async fn ensure_cycle(&self) -> StepOutcome<Cycle> {
        if !self.session.has_token().await {
            warn!("Auth token missing during generation; aborting to login");
            return StepOutcome::HardFailure(HardFailure::Unauthenticated);
        }

        let phase = GenerationPhase::EnsuringCycle;
        let status = match self.api.check_cycle_status().await {
            Ok(status) => status,
            Err(e) if e.is_unauthorized() => return rejected(&e),
            Err(e) => {
                return StepOutcome::SoftFailure(StepFailure::logged(
                    phase,
                    format!("cycle status check failed: {e}"),
                ));
            }
        };

        if let Some(cycle) = status.current_cycle {
            debug!(cycle_number = cycle.cycle_number, "Active cycle present");
            return StepOutcome::Success(cycle);
        }

        match self.api.start_new_cycle().await {
            Ok(response) => {
                info!(cycle_number = response.cycle.cycle_number, "Created cycle for generation");
                StepOutcome::Success(response.cycle)
            }
            Err(e) => StepOutcome::SoftFailure(StepFailure::logged(
                phase,
                format!("cycle creation failed: {e}"),
            )),
        }
    }

    /// Step 3. Generation is requested only when the fetch reports 404,
    /// so an existing program is never regenerated.
    pub async fn fetch_or_generate_program(&self) -> StepOutcome<Program> {
        let phase = GenerationPhase::FetchingProgram;
        match self.api.get_my_program().await {
            Ok(program) => {
                debug!(program_id = program.id, "Existing program found");
                StepOutcome::Success(program)
            }
            Err(e) if e.is_unauthorized() => rejected(&e),
            Err(e) if e.is_not_found() => {
                info!("No program yet; requesting generation");
                match self.api.generate_program().await {
                    Ok(program) => {
                        info!(program_id = program.id, "Program generated");
                        StepOutcome::Success(program)
                    }
                    Err(e) => StepOutcome::SoftFailure(StepFailure::visible(
                        phase,
                        format!("program generation failed: {e}"),
                        e.user_message(),
                    )),
                }
            }
            Err(e) => StepOutcome::SoftFailure(StepFailure::visible(
                phase,
                format!("program fetch failed: {e}"),
                e.user_message(),
            )),
        }
    }

    /// Step 4.
    async fn regenerate_recommendations(&self) -> StepOutcome<()> {
        match self.api.regenerate_recommendations().await {
            Ok(_) => StepOutcome::Success(()),
            Err(e) => StepOutcome::SoftFailure(StepFailure::logged(
                GenerationPhase::RegeneratingRecommendations,
                format!("recommendation regeneration failed: {e}"),
            )),
        }
    }

    /// Step 5. Best-effort enrichment; needs a program id.
    async fn finalize_cycle(&self, program: Option<&Program>) -> StepOutcome<()> {
        let phase = GenerationPhase::FinalizingCycle;
        let Some(program) = program else {
            return StepOutcome::SoftFailure(StepFailure::logged(
                phase,
                "no program to attach to cycle setup",
            ));
        };

        let completions = match self.api.questionnaire_completions().await {
            Ok(completions) => completions,
            Err(e) => {
                return StepOutcome::SoftFailure(StepFailure::logged(
                    phase,
                    format!("questionnaire scores unavailable: {e}"),
                ));
            }
        };
        let scores = CompletionScores::from_completions(&completions);
        let request = CompleteSetupRequest {
            gerdq_score: scores.gerdq,
            rsi_score: scores.rsi,
            program_id: program.id,
        };

        match self.api.complete_cycle_setup(&request).await {
            Ok(_) => {
                info!(
                    program_id = program.id,
                    gerdq = ?scores.gerdq,
                    rsi = ?scores.rsi,
                    "Cycle setup finalized"
                );
                StepOutcome::Success(())
            }
            Err(e) => StepOutcome::SoftFailure(StepFailure::logged(
                phase,
                format!("cycle setup failed: {e}"),
            )),
        }
    }

    /// Step 6.
    async fn clear_progress(&self) -> StepOutcome<()> {
        if self.progress.clear().await {
            StepOutcome::Success(())
        } else {
            StepOutcome::SoftFailure(StepFailure::logged(
                GenerationPhase::ClearingProgress,
                "could not clear onboarding progress",
            ))
        }
    }
}

/// A 401 anywhere in the run means the session is gone.
fn rejected<T>(error: &ApiError) -> StepOutcome<T> {
    warn!(error = %error, "Session rejected during generation; aborting to login");
    StepOutcome::HardFailure(HardFailure::Unauthenticated)
}
