//! Persisted "last onboarding screen" marker.
//!
//! The marker is the screen name, prefixed with `renewal:` when the user is
//! in the renewal flow, e.g. `renewal:gerdq_questionnaire`.

use tracing::{debug, warn};

use crate::store::{Session, keys};

use super::screen::OnboardingScreen;

const RENEWAL_PREFIX: &str = "renewal:";

/// Where an interrupted onboarding session picks up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    pub step: OnboardingScreen,
    pub is_renewal: bool,
}

impl ResumePoint {
    /// Update-only screens always belong to the renewal flow.
    pub fn new(step: OnboardingScreen, is_renewal: bool) -> Self {
        Self {
            step,
            is_renewal: is_renewal || step.is_update_only(),
        }
    }

    pub fn encode(&self) -> String {
        if self.is_renewal {
            format!("{RENEWAL_PREFIX}{}", self.step.as_str())
        } else {
            self.step.as_str().to_string()
        }
    }

    /// Parse a persisted marker. Unknown screens yield `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.strip_prefix(RENEWAL_PREFIX) {
            Some(step) => OnboardingScreen::parse(step).map(|s| Self::new(s, true)),
            None => OnboardingScreen::parse(raw).map(|s| Self::new(s, false)),
        }
    }
}

/// Reads and writes the onboarding progress marker.
///
/// Every onboarding screen calls [`OnboardingProgress::mark`] before it
/// renders, so an interrupted session resumes at the right screen and in
/// the right flow.
#[derive(Clone)]
pub struct OnboardingProgress {
    session: Session,
}

impl OnboardingProgress {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Record `screen` as the current step. Failures are logged only.
    pub async fn mark(&self, screen: OnboardingScreen, is_renewal: bool) {
        let point = ResumePoint::new(screen, is_renewal);
        if self
            .session
            .write(keys::LAST_ONBOARDING_SCREEN, &point.encode())
            .await
        {
            debug!(screen = %screen, is_renewal = point.is_renewal, "Onboarding progress saved");
        }
    }

    /// Move the marker to `screen`, staying in the flow already recorded.
    pub async fn advance_to(&self, screen: OnboardingScreen) {
        let is_renewal = self.load().await.is_some_and(|p| p.is_renewal);
        self.mark(screen, is_renewal).await;
    }

    /// The persisted resume point, if it names a known screen.
    pub async fn load(&self) -> Option<ResumePoint> {
        let raw = self.session.read(keys::LAST_ONBOARDING_SCREEN).await?;
        let point = ResumePoint::decode(&raw);
        if point.is_none() {
            warn!(value = %raw, "Ignoring unrecognized onboarding progress marker");
        }
        point
    }

    /// Forget the marker once onboarding is done. Best-effort.
    pub async fn clear(&self) -> bool {
        self.session.remove(keys::LAST_ONBOARDING_SCREEN).await
    }
}
