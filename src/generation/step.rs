//! Step results and workflow outcomes.

use serde::Serialize;

use crate::api::Program;
use crate::navigation::Screen;

/// The phases of the generation workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Starting,
    VerifyingProfile,
    EnsuringCycle,
    FetchingProgram,
    RegeneratingRecommendations,
    FinalizingCycle,
    ClearingProgress,
    Finished,
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Starting => "starting",
            Self::VerifyingProfile => "verifying_profile",
            Self::EnsuringCycle => "ensuring_cycle",
            Self::FetchingProgram => "fetching_program",
            Self::RegeneratingRecommendations => "regenerating_recommendations",
            Self::FinalizingCycle => "finalizing_cycle",
            Self::ClearingProgress => "clearing_progress",
            Self::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// Failure that ends the current workflow attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardFailure {
    /// No auth token: abort to login, no retry.
    #[error("no auth token")]
    Unauthenticated,
    /// Unexpected failure: the whole workflow is retried.
    #[error("{0}")]
    Retryable(String),
}

/// Result of one workflow step.
#[derive(Debug)]
pub enum StepOutcome<T> {
    Success(T),
    /// Logged and recorded; the workflow continues.
    SoftFailure(StepFailure),
    /// Ends the attempt.
    HardFailure(HardFailure),
}

/// A recorded soft failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub phase: GenerationPhase,
    pub reason: String,
    /// Text to show the user, when the failure is worth surfacing.
    pub user_message: Option<String>,
}

impl StepFailure {
    pub fn logged(phase: GenerationPhase, reason: impl Into<String>) -> Self {
        Self {
            phase,
            reason: reason.into(),
            user_message: None,
        }
    }

    pub fn visible(
        phase: GenerationPhase,
        reason: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            reason: reason.into(),
            user_message: Some(user_message.into()),
        }
    }
}

/// Why generation finished without a program in hand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("program unavailable: {0}")]
    ProgramUnavailable(String),

    #[error("workflow failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("safety timeout elapsed")]
    TimedOut,

    #[error("completion forced by user")]
    Forced,
}

/// Terminal state of a generation run.
///
/// `Completed` and `CompletedWithError` both navigate to the program screen;
/// the distinction only matters for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(Program),
    CompletedWithError(CompletionError),
    /// The session disappeared mid-run.
    Unauthenticated,
}

impl GenerationOutcome {
    pub fn next_screen(&self) -> Screen {
        match self {
            Self::Completed(_) | Self::CompletedWithError(_) => Screen::ProgramDetails,
            Self::Unauthenticated => Screen::Login,
        }
    }

    pub fn program(&self) -> Option<&Program> {
        match self {
            Self::Completed(program) => Some(program),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_completions_route_to_program() {
        let program = Program {
            id: 1,
            payload: Default::default(),
        };
        assert_eq!(
            GenerationOutcome::Completed(program).next_screen(),
            Screen::ProgramDetails
        );
        for err in [
            CompletionError::TimedOut,
            CompletionError::Forced,
            CompletionError::ProgramUnavailable("x".into()),
            CompletionError::RetriesExhausted {
                attempts: 3,
                last_error: "boom".into(),
            },
        ] {
            assert_eq!(
                GenerationOutcome::CompletedWithError(err).next_screen(),
                Screen::ProgramDetails
            );
        }
        assert_eq!(GenerationOutcome::Unauthenticated.next_screen(), Screen::Login);
    }

    #[test]
    fn display_matches_serde() {
        use GenerationPhase::*;
        for phase in [
            Starting,
            VerifyingProfile,
            EnsuringCycle,
            FetchingProgram,
            RegeneratingRecommendations,
            FinalizingCycle,
            ClearingProgress,
            Finished,
        ] {
            assert_eq!(
                format!("\"{phase}\""),
                serde_json::to_string(&phase).unwrap()
            );
        }
    }
}
