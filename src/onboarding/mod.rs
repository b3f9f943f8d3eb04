//! Onboarding flow: the screen sequence and the persisted progress marker.
//!
//! Onboarding is completed once per cycle. The first cycle runs the full
//! questionnaire; later cycles run the abbreviated update flow, which skips
//! fields that rarely change.

pub mod progress;
pub mod screen;

pub use progress::{OnboardingProgress, ResumePoint};
pub use screen::OnboardingScreen;
