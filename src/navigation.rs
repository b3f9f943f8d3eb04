//! Navigation targets and deep links.
//!
//! A [`Screen`] is plain data: the presentation layer decides how to render
//! it. Everything in the crate that "navigates" returns one of these.

use serde::Serialize;

use crate::onboarding::{OnboardingScreen, ResumePoint};

/// URL scheme registered by the app.
pub const APP_SCHEME: &str = "gerdcompanion";

/// Path segment of the password-reset link.
const RESET_PASSWORD: &str = "reset-password";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Login,
    Register,
    ForgotPassword,
    ResetPassword {
        token: String,
    },
    Onboarding {
        step: OnboardingScreen,
        /// Set for the abbreviated flow of cycles after the first.
        is_renewal: bool,
    },
    ProgramDetails,
    Tracker,
    Education,
    Stats,
    Profile,
}

impl Screen {
    /// Start of the full onboarding flow.
    pub fn onboarding_start() -> Self {
        Self::Onboarding {
            step: OnboardingScreen::FIRST,
            is_renewal: false,
        }
    }

    /// Entry of the abbreviated update flow.
    pub fn update_onboarding_start() -> Self {
        Self::Onboarding {
            step: OnboardingScreen::UPDATE_FIRST,
            is_renewal: true,
        }
    }

    /// Resume onboarding at a persisted point, keeping its flow.
    pub fn onboarding_at(point: ResumePoint) -> Self {
        Self::Onboarding {
            step: point.step,
            is_renewal: point.is_renewal,
        }
    }

    /// Screens that need a session to be shown.
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Self::Login | Self::Register | Self::ForgotPassword | Self::ResetPassword { .. }
        )
    }
}

/// Map an incoming URL to a screen.
///
/// Accepted forms:
/// - `gerdcompanion://reset-password?token=abc123`
/// - `gerdcompanion:///reset-password?token=abc123`
/// - `https://<any host>/reset-password?token=abc123`
///
/// Anything else, or a reset link without a non-empty token, yields `None`.
pub fn parse_deep_link(url: &str) -> Option<Screen> {
    let url = reqwest::Url::parse(url.trim()).ok()?;

    let route = match url.scheme() {
        APP_SCHEME => {
            // With the custom scheme the route lands in the host part unless
            // the link used a triple slash.
            let host = url.host_str().unwrap_or_default();
            if host.is_empty() {
                first_segment(&url)
            } else {
                host.to_string()
            }
        }
        "https" | "http" => first_segment(&url),
        _ => return None,
    };

    if route != RESET_PASSWORD {
        return None;
    }

    let token = url
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.trim().to_string())
        .filter(|token| !token.is_empty())?;

    Some(Screen::ResetPassword { token })
}

fn first_segment(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string()
}
