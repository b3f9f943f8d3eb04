//! `CompanionApi` trait: one typed method per backend endpoint.
//!
//! The routing engine, generation poller, and auth service depend on this
//! trait rather than on [`crate::api::ApiClient`] directly.

use async_trait::async_trait;

use crate::api::types::{
    Ack, CompleteSetupRequest, CycleStatus, LoginRequest, LoginResponse, PasswordResetConfirm,
    PasswordResetRequest, Profile, ProfileUpdate, Program, QuestionnaireCompletion,
    RegisterRequest, StartCycleResponse,
};
use crate::error::ApiError;

#[async_trait]
pub trait CompanionApi: Send + Sync {
    /// `POST /api/users/login/`
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST /api/users/register/`
    async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value, ApiError>;

    /// `POST /api/users/password-reset/request/`
    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<Ack, ApiError>;

    /// `POST /api/users/password-reset/confirm/`
    async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirm,
    ) -> Result<Ack, ApiError>;

    /// `GET /api/profiles/me/`
    async fn get_profile(&self) -> Result<Profile, ApiError>;

    /// `PATCH /api/profiles/me/`
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError>;

    /// `POST /api/profiles/complete-onboarding/`
    async fn complete_onboarding(&self) -> Result<Ack, ApiError>;

    /// `GET /api/cycles/check-status/`
    async fn check_cycle_status(&self) -> Result<CycleStatus, ApiError>;

    /// `POST /api/cycles/start-new/`
    async fn start_new_cycle(&self) -> Result<StartCycleResponse, ApiError>;

    /// `POST /api/cycles/complete-setup/`
    async fn complete_cycle_setup(&self, request: &CompleteSetupRequest) -> Result<Ack, ApiError>;

    /// `GET /api/programs/my-program/`. A 404 means no program exists yet.
    async fn get_my_program(&self) -> Result<Program, ApiError>;

    /// `POST /api/programs/generate/`
    async fn generate_program(&self) -> Result<Program, ApiError>;

    /// `POST /api/recommendations/regenerate/`
    async fn regenerate_recommendations(&self) -> Result<serde_json::Value, ApiError>;

    /// `GET /api/questionnaires/completions/me/`
    async fn questionnaire_completions(&self) -> Result<Vec<QuestionnaireCompletion>, ApiError>;
}
