//! Generation poller: assembles the personalized program after the last
//! onboarding screen and always moves the user forward.
//!
//! The workflow is sequential and mostly fault-tolerant; the poller adds
//! whole-workflow retries, a safety ceiling, a minimum display time, and a
//! manual force-completion path.

pub mod poller;
pub mod step;
pub mod view;
pub mod workflow;

pub use poller::{ForceSignal, ForceTrigger, GenerationHandle, GenerationPoller, force_channel};
pub use step::{
    CompletionError, GenerationOutcome, GenerationPhase, HardFailure, StepFailure, StepOutcome,
};
pub use view::{GenerationView, PHRASES};
pub use workflow::WorkflowReport;
