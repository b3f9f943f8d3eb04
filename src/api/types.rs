//! Request and response schemas for the backend API.
//!
//! Required fields are required: a response missing them fails decoding at
//! the boundary instead of flowing through as a default.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/users/login/` response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(deserialize_with = "deserialize_secret")]
    pub token: SecretString,
    #[serde(default)]
    pub has_profile: bool,
    #[serde(default)]
    pub onboarding_complete: bool,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl LoginResponse {
    pub fn flags(&self) -> ProfileFlags {
        ProfileFlags {
            has_profile: self.has_profile,
            onboarding_complete: self.onboarding_complete,
        }
    }
}

/// Server-reported profile state that drives post-login routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileFlags {
    pub has_profile: bool,
    pub onboarding_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// `GET /api/profiles/me/`. Only the fields the client core reads are typed;
/// everything else is kept in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `PATCH /api/profiles/me/` body. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
}

/// A server-tracked renewal period.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cycle {
    pub cycle_number: u32,
    #[serde(default)]
    pub id: Option<i64>,
}

impl Cycle {
    /// Cycles after the first use the abbreviated update onboarding.
    pub fn is_renewal(&self) -> bool {
        self.cycle_number > 1
    }
}

/// `GET /api/cycles/check-status/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CycleStatus {
    pub needs_renewal: bool,
    #[serde(default)]
    pub current_cycle: Option<Cycle>,
    #[serde(default)]
    pub days_remaining: Option<i64>,
    #[serde(default)]
    pub days_elapsed: Option<i64>,
    #[serde(default)]
    pub has_completed_onboarding: bool,
}

impl CycleStatus {
    /// A renewal is due and nothing has been started for it yet.
    pub fn requires_new_cycle(&self) -> bool {
        self.needs_renewal && self.current_cycle.is_none()
    }
}

/// `POST /api/cycles/start-new/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct StartCycleResponse {
    pub cycle: Cycle,
}

/// `POST /api/cycles/complete-setup/` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteSetupRequest {
    pub gerdq_score: Option<i32>,
    pub rsi_score: Option<i32>,
    pub program_id: i64,
}

/// Generated program. The payload is backend-owned; only the id is read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Program {
    pub id: i64,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// One entry of `GET /api/questionnaires/completions/me/`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionnaireCompletion {
    /// Questionnaire code, e.g. `GERDQ` or `RSI`.
    pub questionnaire: String,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Latest GERDQ and RSI scores, as submitted when finalizing a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionScores {
    pub gerdq: Option<i32>,
    pub rsi: Option<i32>,
}

impl CompletionScores {
    /// Pick the most recent scored completion for each questionnaire.
    /// Entries without a timestamp rank below timestamped ones.
    pub fn from_completions(completions: &[QuestionnaireCompletion]) -> Self {
        let latest = |code: &str| {
            completions
                .iter()
                .filter(|c| c.questionnaire.eq_ignore_ascii_case(code) && c.score.is_some())
                .max_by_key(|c| c.completed_at)
                .and_then(|c| c.score)
        };
        Self {
            gerdq: latest("GERDQ"),
            rsi: latest("RSI"),
        }
    }
}

/// Generic `{ "detail": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;

    #[test]
    fn login_response_requires_token() {
        let ok: LoginResponse = serde_json::from_value(json!({
            "token": "abc",
            "has_profile": true,
            "onboarding_complete": false
        }))
        .unwrap();
        assert_eq!(ok.token.expose_secret(), "abc");
        assert_eq!(
            ok.flags(),
            ProfileFlags {
                has_profile: true,
                onboarding_complete: false
            }
        );

        assert!(serde_json::from_value::<LoginResponse>(json!({"has_profile": true})).is_err());
    }

    #[test]
    fn cycle_status_requires_new_cycle() {
        let status: CycleStatus = serde_json::from_value(json!({
            "needs_renewal": true,
            "current_cycle": null,
            "days_remaining": 0,
            "days_elapsed": 31,
            "has_completed_onboarding": true
        }))
        .unwrap();
        assert!(status.requires_new_cycle());

        let status: CycleStatus = serde_json::from_value(json!({
            "needs_renewal": true,
            "current_cycle": {"cycle_number": 2}
        }))
        .unwrap();
        assert!(!status.requires_new_cycle());
        assert!(status.current_cycle.unwrap().is_renewal());
    }

    #[test]
    fn program_keeps_payload() {
        let program: Program = serde_json::from_value(json!({
            "id": 12,
            "title": "Reflux reset",
            "weeks": 4
        }))
        .unwrap();
        assert_eq!(program.id, 12);
        assert_eq!(program.payload["title"], "Reflux reset");
    }

    #[test]
    fn scores_pick_latest_per_questionnaire() {
        let completions: Vec<QuestionnaireCompletion> = serde_json::from_value(json!([
            {"questionnaire": "GERDQ", "score": 9, "completed_at": "2026-01-01T00:00:00Z"},
            {"questionnaire": "GERDQ", "score": 6, "completed_at": "2026-02-01T00:00:00Z"},
            {"questionnaire": "rsi", "score": 14},
            {"questionnaire": "RSI", "score": null, "completed_at": "2026-03-01T00:00:00Z"},
            {"questionnaire": "LIFESTYLE", "score": 3}
        ]))
        .unwrap();
        let scores = CompletionScores::from_completions(&completions);
        assert_eq!(scores.gerdq, Some(6));
        assert_eq!(scores.rsi, Some(14));
    }

    #[test]
    fn complete_setup_serializes_scores() {
        let body = CompleteSetupRequest {
            gerdq_score: Some(8),
            rsi_score: None,
            program_id: 3,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"gerdq_score": 8, "rsi_score": null, "program_id": 3})
        );
    }
}
