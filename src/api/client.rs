//! HTTP client for the companion backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::provider::CompanionApi;
use crate::api::types::{
    Ack, CompleteSetupRequest, CycleStatus, LoginRequest, LoginResponse, PasswordResetConfirm,
    PasswordResetRequest, Profile, ProfileUpdate, Program, QuestionnaireCompletion,
    RegisterRequest, StartCycleResponse,
};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::store::{SecureStore, Session};

/// Backend paths, relative to the configured base URL.
pub mod paths {
    pub const LOGIN: &str = "/api/users/login/";
    pub const REGISTER: &str = "/api/users/register/";
    pub const PASSWORD_RESET_REQUEST: &str = "/api/users/password-reset/request/";
    pub const PASSWORD_RESET_CONFIRM: &str = "/api/users/password-reset/confirm/";
    pub const PROFILE: &str = "/api/profiles/me/";
    pub const COMPLETE_ONBOARDING: &str = "/api/profiles/complete-onboarding/";
    pub const CYCLE_STATUS: &str = "/api/cycles/check-status/";
    pub const START_CYCLE: &str = "/api/cycles/start-new/";
    pub const COMPLETE_SETUP: &str = "/api/cycles/complete-setup/";
    pub const MY_PROGRAM: &str = "/api/programs/my-program/";
    pub const GENERATE_PROGRAM: &str = "/api/programs/generate/";
    pub const REGENERATE_RECOMMENDATIONS: &str = "/api/recommendations/regenerate/";
    pub const QUESTIONNAIRE_COMPLETIONS: &str = "/api/questionnaires/completions/me/";
}

/// Header carrying a per-request correlation id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client that attaches the stored auth token to every request.
///
/// The token is looked up in the store for each call, so a login or logout
/// takes effect on the very next request.
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    session: Session,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, store: Arc<dyn SecureStore>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
            session: Session::new(store),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and decode the JSON response.
    ///
    /// No response → [`ApiError::Network`] / [`ApiError::Timeout`];
    /// status >= 400 → [`ApiError::Http`] with the server's error body.
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        let mut builder = self
            .client
            .request(method.clone(), self.url(path))
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(token) = self.session.token().await {
            builder = builder.header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", token.expose_secret()),
            );
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(%method, path, %request_id, "API request");

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if status.as_u16() >= 400 {
            warn!(%method, path, %request_id, status = status.as_u16(), "API request failed");
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: error_body(&bytes),
            });
        }

        debug!(%method, path, %request_id, status = status.as_u16(), "API response");
        decode(path, &bytes)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(&serde_json::json!({})))
            .await
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout {
                timeout: self.timeout,
            }
        } else {
            ApiError::Network {
                reason: e.to_string(),
            }
        }
    }
}

fn error_body(bytes: &[u8]) -> Option<serde_json::Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            (!text.is_empty()).then_some(serde_json::Value::String(text))
        }
    }
}

/// Decode a success body. An empty body decodes as `{}` so acknowledgement
/// types still work with `204 No Content`.
fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, ApiError> {
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl CompanionApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.post(paths::LOGIN, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value, ApiError> {
        self.post(paths::REGISTER, request).await
    }

    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<Ack, ApiError> {
        self.post(paths::PASSWORD_RESET_REQUEST, request).await
    }

    async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirm,
    ) -> Result<Ack, ApiError> {
        self.post(paths::PASSWORD_RESET_CONFIRM, request).await
    }

    async fn get_profile(&self) -> Result<Profile, ApiError> {
        self.get(paths::PROFILE).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.request(Method::PATCH, paths::PROFILE, Some(update))
            .await
    }

    async fn complete_onboarding(&self) -> Result<Ack, ApiError> {
        self.post_empty(paths::COMPLETE_ONBOARDING).await
    }

    async fn check_cycle_status(&self) -> Result<CycleStatus, ApiError> {
        self.get(paths::CYCLE_STATUS).await
    }

    async fn start_new_cycle(&self) -> Result<StartCycleResponse, ApiError> {
        self.post_empty(paths::START_CYCLE).await
    }

    async fn complete_cycle_setup(&self, request: &CompleteSetupRequest) -> Result<Ack, ApiError> {
        self.post(paths::COMPLETE_SETUP, request).await
    }

    async fn get_my_program(&self) -> Result<Program, ApiError> {
        self.get(paths::MY_PROGRAM).await
    }

    async fn generate_program(&self) -> Result<Program, ApiError> {
        self.post_empty(paths::GENERATE_PROGRAM).await
    }

    async fn regenerate_recommendations(&self) -> Result<serde_json::Value, ApiError> {
        self.post_empty(paths::REGENERATE_RECOMMENDATIONS).await
    }

    async fn questionnaire_completions(&self) -> Result<Vec<QuestionnaireCompletion>, ApiError> {
        self.get(paths::QUESTIONNAIRE_COMPLETIONS).await
    }
}
