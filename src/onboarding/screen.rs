//! Onboarding screens and their order.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The screens of the onboarding questionnaire.
///
/// Full flow: Welcome → PersonalInfo → WeightHeight → MedicalHistory →
/// Lifestyle → GerdqQuestionnaire → RsiQuestionnaire → Review → Generating.
///
/// Update (renewal) flow: UpdateWelcome → UpdateWeightHeight →
/// GerdqQuestionnaire → RsiQuestionnaire → Review → Generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingScreen {
    Welcome,
    PersonalInfo,
    WeightHeight,
    MedicalHistory,
    Lifestyle,
    UpdateWelcome,
    UpdateWeightHeight,
    GerdqQuestionnaire,
    RsiQuestionnaire,
    Review,
    Generating,
}

impl OnboardingScreen {
    pub const ALL: [OnboardingScreen; 11] = [
        Self::Welcome,
        Self::PersonalInfo,
        Self::WeightHeight,
        Self::MedicalHistory,
        Self::Lifestyle,
        Self::UpdateWelcome,
        Self::UpdateWeightHeight,
        Self::GerdqQuestionnaire,
        Self::RsiQuestionnaire,
        Self::Review,
        Self::Generating,
    ];

    /// First screen of the full flow.
    pub const FIRST: OnboardingScreen = Self::Welcome;

    /// First screen of the renewal flow.
    pub const UPDATE_FIRST: OnboardingScreen = Self::UpdateWelcome;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::PersonalInfo => "personal_info",
            Self::WeightHeight => "weight_height",
            Self::MedicalHistory => "medical_history",
            Self::Lifestyle => "lifestyle",
            Self::UpdateWelcome => "update_welcome",
            Self::UpdateWeightHeight => "update_weight_height",
            Self::GerdqQuestionnaire => "gerdq_questionnaire",
            Self::RsiQuestionnaire => "rsi_questionnaire",
            Self::Review => "review",
            Self::Generating => "generating",
        }
    }

    /// Parse a persisted marker. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    /// Screens that only exist in the renewal flow.
    pub fn is_update_only(&self) -> bool {
        matches!(self, Self::UpdateWelcome | Self::UpdateWeightHeight)
    }

    /// Screens that only exist in the full flow.
    pub fn is_full_only(&self) -> bool {
        matches!(
            self,
            Self::Welcome
                | Self::PersonalInfo
                | Self::WeightHeight
                | Self::MedicalHistory
                | Self::Lifestyle
        )
    }

    /// Whether this is the hand-off to program generation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Generating)
    }

    /// Next screen in the flow selected by `is_renewal`.
    ///
    /// In the renewal flow the stable fields are skipped: updated
    /// weight/height goes straight to the symptom questionnaire.
    pub fn next(&self, is_renewal: bool) -> Option<OnboardingScreen> {
        use OnboardingScreen::*;
        match self {
            Welcome => Some(PersonalInfo),
            PersonalInfo => Some(WeightHeight),
            WeightHeight if is_renewal => Some(GerdqQuestionnaire),
            WeightHeight => Some(MedicalHistory),
            MedicalHistory => Some(Lifestyle),
            Lifestyle => Some(GerdqQuestionnaire),
            UpdateWelcome => Some(UpdateWeightHeight),
            UpdateWeightHeight => Some(GerdqQuestionnaire),
            GerdqQuestionnaire => Some(RsiQuestionnaire),
            RsiQuestionnaire => Some(Review),
            Review => Some(Generating),
            Generating => None,
        }
    }

    /// Check if moving from `self` to `target` follows the flow.
    pub fn can_transition_to(&self, target: OnboardingScreen, is_renewal: bool) -> bool {
        self.next(is_renewal) == Some(target)
    }
}

impl std::fmt::Display for OnboardingScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnboardingScreen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown onboarding screen: {s}"))
    }
}
