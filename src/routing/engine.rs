//! RoutingEngine applies the routing decision against live session and
//! server state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::api::{CompanionApi, ProfileFlags};
use crate::navigation::Screen;
use crate::onboarding::OnboardingProgress;
use crate::store::Session;

use super::state::{CycleDecision, RouteState, decide_after_login};

/// Decides which screen the user lands on.
///
/// A missing token at any checkpoint routes to login and overrides every
/// other decision. Failed status checks never block onboarding.
pub struct RoutingEngine {
    api: Arc<dyn CompanionApi>,
    session: Session,
    progress: OnboardingProgress,
    /// Set while a cycle check is running so overlapping checks cannot
    /// both create a cycle.
    cycle_check_in_flight: AtomicBool,
}

impl RoutingEngine {
    pub fn new(api: Arc<dyn CompanionApi>, session: Session) -> Self {
        let progress = OnboardingProgress::new(session.clone());
        Self {
            api,
            session,
            progress,
            cycle_check_in_flight: AtomicBool::new(false),
        }
    }

    pub fn progress(&self) -> &OnboardingProgress {
        &self.progress
    }

    /// Post-login routing from the flags returned by the login call.
    pub async fn route_after_login(&self, flags: ProfileFlags) -> RouteState {
        if !self.session.has_token().await {
            info!("No auth token after login; routing to login");
            return RouteState::Unauthenticated;
        }
        let progress = self.progress.load().await;
        let state = decide_after_login(flags, progress);
        info!(
            has_profile = flags.has_profile,
            onboarding_complete = flags.onboarding_complete,
            progress = ?progress,
            state = ?state,
            "Post-login route decided"
        );
        state
    }

    /// Check cycle status and create a new cycle when one is due.
    ///
    /// At most one cycle is created per check, and overlapping checks are
    /// collapsed into one via [`CycleDecision::AlreadyInFlight`].
    pub async fn check_cycle(&self) -> CycleDecision {
        if !self.session.has_token().await {
            return CycleDecision::Unauthenticated;
        }

        let Some(_guard) = InFlightGuard::acquire(&self.cycle_check_in_flight) else {
            debug!("Cycle check already in flight; skipping");
            return CycleDecision::AlreadyInFlight;
        };

        let status = match self.api.check_cycle_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Cycle status check failed; continuing onboarding");
                return CycleDecision::CheckFailed(e.to_string());
            }
        };

        debug!(
            needs_renewal = status.needs_renewal,
            has_current_cycle = status.current_cycle.is_some(),
            days_remaining = ?status.days_remaining,
            days_elapsed = ?status.days_elapsed,
            "Cycle status"
        );

        if !status.requires_new_cycle() {
            return CycleDecision::NoRenewalNeeded;
        }

        debug!(state = ?RouteState::AwaitingCycleDecision, "Requesting new cycle");
        match self.api.start_new_cycle().await {
            Ok(response) => {
                info!(cycle_number = response.cycle.cycle_number, "New cycle started");
                CycleDecision::for_new_cycle(response.cycle)
            }
            Err(e) => {
                warn!(error = %e, "Starting a new cycle failed; continuing onboarding");
                CycleDecision::CheckFailed(e.to_string())
            }
        }
    }

    /// Routing on entry to the start-of-onboarding screen.
    ///
    /// A due cycle decides the flow; otherwise an interrupted session resumes
    /// at its persisted step; otherwise the user stays at the first screen.
    pub async fn enter_onboarding(&self) -> Screen {
        let decision = self.check_cycle().await;
        if let Some(screen) = decision.screen() {
            return screen;
        }
        match self.progress.load().await {
            Some(point) => {
                info!(step = %point.step, is_renewal = point.is_renewal, "Resuming onboarding");
                Screen::onboarding_at(point)
            }
            None => Screen::onboarding_start(),
        }
    }
}

/// Clears the in-flight flag when dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
