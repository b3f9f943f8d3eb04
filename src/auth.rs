//! Authentication screens' operations: login, registration, password reset,
//! logout, and centralized handling of rejected sessions.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{
    CompanionApi, LoginRequest, PasswordResetConfirm, PasswordResetRequest, RegisterRequest,
};
use crate::error::{ApiError, Error, Result};
use crate::navigation::Screen;
use crate::routing::RoutingEngine;
use crate::store::Session;

pub struct AuthService {
    api: Arc<dyn CompanionApi>,
    session: Session,
    routing: Arc<RoutingEngine>,
}

impl AuthService {
    pub fn new(api: Arc<dyn CompanionApi>, session: Session, routing: Arc<RoutingEngine>) -> Self {
        Self {
            api,
            session,
            routing,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The login screen clears any stale session before it is shown.
    pub async fn enter_login_screen(&self) -> Screen {
        self.session.clear().await;
        Screen::Login
    }

    /// Authenticate, persist the session, and decide the landing screen.
    pub async fn login(&self, username: &str, password: &str) -> Result<Screen> {
        let username = username.trim();
        let response = self
            .api
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        if !self.session.begin(&response.token, username).await {
            warn!(username, "Login succeeded but the session could not be stored");
        }
        info!(username, "Logged in");

        // Post-login states are all terminal.
        let state = self.routing.route_after_login(response.flags()).await;
        state.screen().ok_or(Error::Unauthenticated)
    }

    /// Create an account. The user signs in afterwards.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Screen> {
        self.api.register(request).await?;
        info!(username = %request.username, "Account registered");
        Ok(Screen::Login)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>> {
        let ack = self
            .api
            .request_password_reset(&PasswordResetRequest {
                email: email.trim().to_string(),
            })
            .await?;
        Ok(ack.detail)
    }

    /// Set a new password with the token from the reset link.
    pub async fn confirm_password_reset(&self, token: &str, new_password: &str) -> Result<Screen> {
        self.api
            .confirm_password_reset(&PasswordResetConfirm {
                token: token.to_string(),
                new_password: new_password.to_string(),
            })
            .await?;
        info!("Password reset confirmed");
        Ok(Screen::Login)
    }

    /// End the session.
    pub async fn logout(&self) -> Screen {
        self.session.clear().await;
        info!("Logged out");
        Screen::Login
    }

    /// Central 401 policy: a rejected token ends the session and sends the
    /// user to login. Other errors are left to the calling screen.
    pub async fn handle_api_error(&self, error: &ApiError) -> Option<Screen> {
        if !error.is_unauthorized() {
            return None;
        }
        warn!("Session rejected by server; signing out");
        self.session.clear().await;
        Some(Screen::Login)
    }
}
