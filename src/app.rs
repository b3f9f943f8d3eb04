//! Composition root. Wires the store, API client, routing engine, auth
//! service, and generation poller together.

use std::sync::Arc;

use crate::api::{ApiClient, CompanionApi};
use crate::auth::AuthService;
use crate::config::{ClientConfig, GenerationConfig};
use crate::error::Result;
use crate::generation::GenerationPoller;
use crate::navigation::{Screen, parse_deep_link};
use crate::onboarding::OnboardingProgress;
use crate::routing::RoutingEngine;
use crate::store::{FileStore, SecureStore, Session};

pub struct CompanionApp {
    api: Arc<dyn CompanionApi>,
    session: Session,
    routing: Arc<RoutingEngine>,
    auth: AuthService,
    generation: GenerationConfig,
}

impl CompanionApp {
    /// Open the file-backed store and an HTTP client for `config`.
    pub async fn open(config: &ClientConfig, generation: GenerationConfig) -> Result<Self> {
        let store: Arc<dyn SecureStore> = Arc::new(FileStore::open(&config.store_path).await?);
        let api: Arc<dyn CompanionApi> = Arc::new(ApiClient::new(config, Arc::clone(&store))?);
        Ok(Self::from_parts(api, store, generation))
    }

    /// Build from an existing API implementation and store.
    pub fn from_parts(
        api: Arc<dyn CompanionApi>,
        store: Arc<dyn SecureStore>,
        generation: GenerationConfig,
    ) -> Self {
        let session = Session::new(store);
        let routing = Arc::new(RoutingEngine::new(Arc::clone(&api), session.clone()));
        let auth = AuthService::new(Arc::clone(&api), session.clone(), Arc::clone(&routing));
        Self {
            api,
            session,
            routing,
            auth,
            generation,
        }
    }

    pub fn api(&self) -> &Arc<dyn CompanionApi> {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn routing(&self) -> &Arc<RoutingEngine> {
        &self.routing
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn progress(&self) -> &OnboardingProgress {
        self.routing.progress()
    }

    /// A fresh poller for the generation screen.
    pub fn generation_poller(&self) -> Arc<GenerationPoller> {
        Arc::new(GenerationPoller::new(
            Arc::clone(&self.api),
            self.session.clone(),
            self.generation.clone(),
        ))
    }

    /// Screen for an incoming deep link, if it is one the app handles.
    pub fn open_deep_link(&self, url: &str) -> Option<Screen> {
        parse_deep_link(url)
    }
}
