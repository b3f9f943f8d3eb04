//! Routing states and the pure post-login decision.

use crate::api::{Cycle, ProfileFlags};
use crate::navigation::Screen;
use crate::onboarding::ResumePoint;

/// Where the routing engine has decided to send the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteState {
    /// No token: back to login, whatever else was pending.
    Unauthenticated,
    /// Profile exists and onboarding is done.
    RoutingToProgram,
    /// Onboarding was interrupted at this point.
    ResumingOnboarding(ResumePoint),
    /// Onboarding from the first screen.
    StartingOnboarding,
    /// A new cycle is being requested; the outcome picks the flow.
    AwaitingCycleDecision,
}

impl RouteState {
    /// Terminal states map to a screen; `AwaitingCycleDecision` does not.
    pub fn screen(&self) -> Option<Screen> {
        match self {
            Self::Unauthenticated => Some(Screen::Login),
            Self::RoutingToProgram => Some(Screen::ProgramDetails),
            Self::ResumingOnboarding(point) => Some(Screen::onboarding_at(*point)),
            Self::StartingOnboarding => Some(Screen::onboarding_start()),
            Self::AwaitingCycleDecision => None,
        }
    }
}

/// Decide the landing state after a successful login.
///
/// 1. profile exists and onboarding is complete → program
/// 2. a valid persisted step → resume there
/// 3. otherwise → start onboarding
pub fn decide_after_login(
    flags: ProfileFlags,
    progress: Option<ResumePoint>,
) -> RouteState {
    if flags.has_profile && flags.onboarding_complete {
        return RouteState::RoutingToProgram;
    }
    match progress {
        Some(point) => RouteState::ResumingOnboarding(point),
        None => RouteState::StartingOnboarding,
    }
}

/// Result of a cycle-status check at onboarding entry or from the watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleDecision {
    /// No token; go to login.
    Unauthenticated,
    /// Nothing to renew.
    NoRenewalNeeded,
    /// A first cycle was created: full onboarding.
    StartFullOnboarding(Cycle),
    /// A later cycle was created: abbreviated update onboarding.
    StartUpdateOnboarding(Cycle),
    /// Another check is already creating a cycle.
    AlreadyInFlight,
    /// The status check or cycle creation failed; onboarding proceeds.
    CheckFailed(String),
}

impl CycleDecision {
    /// Branch on the number of a freshly created cycle.
    pub fn for_new_cycle(cycle: Cycle) -> Self {
        if cycle.is_renewal() {
            Self::StartUpdateOnboarding(cycle)
        } else {
            Self::StartFullOnboarding(cycle)
        }
    }

    /// Screen this decision navigates to, `None` when the user stays put.
    pub fn screen(&self) -> Option<Screen> {
        match self {
            Self::Unauthenticated => Some(Screen::Login),
            Self::StartFullOnboarding(_) => Some(Screen::onboarding_start()),
            Self::StartUpdateOnboarding(_) => Some(Screen::update_onboarding_start()),
            Self::NoRenewalNeeded | Self::AlreadyInFlight | Self::CheckFailed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::OnboardingScreen;

    const ALL_FLAGS: [ProfileFlags; 4] = [
        ProfileFlags {
            has_profile: false,
            onboarding_complete: false,
        },
        ProfileFlags {
            has_profile: false,
            onboarding_complete: true,
        },
        ProfileFlags {
            has_profile: true,
            onboarding_complete: false,
        },
        ProfileFlags {
            has_profile: true,
            onboarding_complete: true,
        },
    ];

    fn progress_values() -> Vec<Option<ResumePoint>> {
        let points = OnboardingScreen::ALL
            .into_iter()
            .flat_map(|s| [ResumePoint::new(s, false), ResumePoint::new(s, true)]);
        std::iter::once(None).chain(points.map(Some)).collect()
    }

    #[test]
    fn complete_profile_always_routes_to_program() {
        let flags = ProfileFlags {
            has_profile: true,
            onboarding_complete: true,
        };
        for progress in progress_values() {
            assert_eq!(
                decide_after_login(flags, progress),
                RouteState::RoutingToProgram,
                "progress {progress:?}"
            );
        }
    }

    #[test]
    fn incomplete_onboarding_resumes_at_persisted_screen() {
        for flags in ALL_FLAGS.into_iter().filter(|f| !(f.has_profile && f.onboarding_complete)) {
            for point in progress_values().into_iter().flatten() {
                assert_eq!(
                    decide_after_login(flags, Some(point)),
                    RouteState::ResumingOnboarding(point)
                );
            }
        }
    }

    #[test]
    fn no_progress_starts_at_first_screen() {
        for flags in ALL_FLAGS.into_iter().filter(|f| !(f.has_profile && f.onboarding_complete)) {
            let state = decide_after_login(flags, None);
            assert_eq!(state, RouteState::StartingOnboarding);
            assert_eq!(state.screen(), Some(Screen::onboarding_start()));
        }
    }

    #[test]
    fn unrecognized_progress_falls_back_to_first_screen() {
        let flags = ProfileFlags::default();
        let progress = ResumePoint::decode("legacy_diet_screen");
        assert_eq!(
            decide_after_login(flags, progress).screen(),
            Some(Screen::onboarding_start())
        );
    }

    #[test]
    fn cycle_number_picks_the_flow() {
        let first = CycleDecision::for_new_cycle(Cycle {
            cycle_number: 1,
            id: None,
        });
        assert_eq!(first.screen(), Some(Screen::onboarding_start()));

        let second = CycleDecision::for_new_cycle(Cycle {
            cycle_number: 2,
            id: Some(9),
        });
        assert!(matches!(second, CycleDecision::StartUpdateOnboarding(_)));
        assert_eq!(
            second.screen(),
            Some(Screen::Onboarding {
                step: OnboardingScreen::UpdateWelcome,
                is_renewal: true
            })
        );
    }

    #[test]
    fn resumed_renewal_keeps_its_flag() {
        let state = RouteState::ResumingOnboarding(ResumePoint::new(
            OnboardingScreen::GerdqQuestionnaire,
            true,
        ));
        assert_eq!(
            state.screen(),
            Some(Screen::Onboarding {
                step: OnboardingScreen::GerdqQuestionnaire,
                is_renewal: true
            })
        );
    }

    #[test]
    fn awaiting_has_no_screen() {
        assert_eq!(RouteState::AwaitingCycleDecision.screen(), None);
        assert_eq!(RouteState::Unauthenticated.screen(), Some(Screen::Login));
        assert_eq!(CycleDecision::CheckFailed("x".into()).screen(), None);
    }
}
