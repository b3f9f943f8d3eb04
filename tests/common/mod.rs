//! Shared stub backend for integration tests (no real HTTP).
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use gerd_companion::api::{
    Ack, CompanionApi, CompleteSetupRequest, CycleStatus, LoginRequest, LoginResponse,
    PasswordResetConfirm, PasswordResetRequest, Profile, ProfileUpdate, Program,
    QuestionnaireCompletion, RegisterRequest, StartCycleResponse,
};
use gerd_companion::error::ApiError;
use gerd_companion::store::{MemoryStore, SecureStore, Session, keys};

/// Handler for one endpoint. Receives the 1-based call count.
type Handler<T> = Box<dyn Fn(usize) -> Result<T, ApiError> + Send + Sync>;

pub fn decode<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("stub payload should decode")
}

pub fn http(status: u16) -> ApiError {
    ApiError::Http { status, body: None }
}

pub fn network() -> ApiError {
    ApiError::Network {
        reason: "connection refused".into(),
    }
}

pub fn program(id: i64) -> Program {
    decode(json!({"id": id, "title": "Reflux reset"}))
}

pub fn cycle_status(needs_renewal: bool, current_cycle: Option<u32>) -> CycleStatus {
    decode(json!({
        "needs_renewal": needs_renewal,
        "current_cycle": current_cycle.map(|n| json!({"cycle_number": n})),
        "days_remaining": 0,
        "days_elapsed": 30,
        "has_completed_onboarding": true
    }))
}

pub fn started_cycle(cycle_number: u32) -> StartCycleResponse {
    decode(json!({"cycle": {"cycle_number": cycle_number, "id": 40 + cycle_number}}))
}

/// Stub `CompanionApi` recording every call by endpoint name.
pub struct StubApi {
    calls: Mutex<Vec<&'static str>>,
    delays: HashMap<&'static str, Duration>,
    hang: AtomicBool,
    login: Handler<LoginResponse>,
    profile: Handler<Profile>,
    cycle_status: Handler<CycleStatus>,
    start_cycle: Handler<StartCycleResponse>,
    my_program: Handler<Program>,
    generate: Handler<Program>,
    regenerate: Handler<Value>,
    completions: Handler<Vec<QuestionnaireCompletion>>,
    complete_setup: Handler<Ack>,
    complete_onboarding: Handler<Ack>,
    setup_requests: Mutex<Vec<CompleteSetupRequest>>,
}

impl Default for StubApi {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            delays: HashMap::new(),
            hang: AtomicBool::new(false),
            login: Box::new(|_| {
                Ok(decode(json!({
                    "token": "tok-123",
                    "has_profile": false,
                    "onboarding_complete": false
                })))
            }),
            profile: Box::new(|_| Ok(decode(json!({"onboarding_complete": true})))),
            cycle_status: Box::new(|_| Ok(cycle_status(false, Some(1)))),
            start_cycle: Box::new(|_| Ok(started_cycle(1))),
            my_program: Box::new(|_| Ok(program(7))),
            generate: Box::new(|_| Ok(program(8))),
            regenerate: Box::new(|_| Ok(json!({"count": 5}))),
            completions: Box::new(|_| {
                Ok(decode(json!([
                    {"questionnaire": "GERDQ", "score": 9},
                    {"questionnaire": "RSI", "score": 14}
                ])))
            }),
            complete_setup: Box::new(|_| Ok(Ack::default())),
            complete_onboarding: Box::new(|_| Ok(Ack::default())),
            setup_requests: Mutex::new(Vec::new()),
        }
    }
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login(
        mut self,
        f: impl Fn(usize) -> Result<LoginResponse, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.login = Box::new(f);
        self
    }

    pub fn with_profile(
        mut self,
        f: impl Fn(usize) -> Result<Profile, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.profile = Box::new(f);
        self
    }

    pub fn with_cycle_status(
        mut self,
        f: impl Fn(usize) -> Result<CycleStatus, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.cycle_status = Box::new(f);
        self
    }

    pub fn with_start_cycle(
        mut self,
        f: impl Fn(usize) -> Result<StartCycleResponse, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.start_cycle = Box::new(f);
        self
    }

    pub fn with_my_program(
        mut self,
        f: impl Fn(usize) -> Result<Program, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.my_program = Box::new(f);
        self
    }

    pub fn with_generate(
        mut self,
        f: impl Fn(usize) -> Result<Program, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.generate = Box::new(f);
        self
    }

    pub fn with_regenerate(
        mut self,
        f: impl Fn(usize) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.regenerate = Box::new(f);
        self
    }

    pub fn with_completions(
        mut self,
        f: impl Fn(usize) -> Result<Vec<QuestionnaireCompletion>, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.completions = Box::new(f);
        self
    }

    pub fn with_complete_setup(
        mut self,
        f: impl Fn(usize) -> Result<Ack, ApiError> + Send + Sync + 'static,
    ) -> Self {
        self.complete_setup = Box::new(f);
        self
    }

    /// Delay every call to `endpoint` by `delay`.
    pub fn with_delay(mut self, endpoint: &'static str, delay: Duration) -> Self {
        self.delays.insert(endpoint, delay);
        self
    }

    /// Make every call hang forever.
    pub fn hanging(self) -> Self {
        self.hang.store(true, Ordering::Relaxed);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == endpoint).count()
    }

    pub fn setup_requests(&self) -> Vec<CompleteSetupRequest> {
        self.setup_requests.lock().unwrap().clone()
    }

    async fn call<T>(
        &self,
        endpoint: &'static str,
        handler: &(dyn Fn(usize) -> Result<T, ApiError> + Send + Sync),
    ) -> Result<T, ApiError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(endpoint);
            calls.iter().filter(|c| **c == endpoint).count()
        };
        if let Some(delay) = self.delays.get(endpoint) {
            tokio::time::sleep(*delay).await;
        }
        if self.hang.load(Ordering::Relaxed) {
            std::future::pending::<()>().await;
        }
        handler(n)
    }
}

#[async_trait]
impl CompanionApi for StubApi {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.call("login", &*self.login).await
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<Value, ApiError> {
        self.call("register", &|_: usize| Ok(json!({"id": 1}))).await
    }

    async fn request_password_reset(
        &self,
        _request: &PasswordResetRequest,
    ) -> Result<Ack, ApiError> {
        self.call("request_password_reset", &|_: usize| Ok(Ack::default())).await
    }

    async fn confirm_password_reset(
        &self,
        _request: &PasswordResetConfirm,
    ) -> Result<Ack, ApiError> {
        self.call("confirm_password_reset", &|_: usize| Ok(Ack::default())).await
    }

    async fn get_profile(&self) -> Result<Profile, ApiError> {
        self.call("get_profile", &*self.profile).await
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.call("update_profile", &*self.profile).await
    }

    async fn complete_onboarding(&self) -> Result<Ack, ApiError> {
        self.call("complete_onboarding", &*self.complete_onboarding).await
    }

    async fn check_cycle_status(&self) -> Result<CycleStatus, ApiError> {
        self.call("check_cycle_status", &*self.cycle_status).await
    }

    async fn start_new_cycle(&self) -> Result<StartCycleResponse, ApiError> {
        self.call("start_new_cycle", &*self.start_cycle).await
    }

    async fn complete_cycle_setup(&self, request: &CompleteSetupRequest) -> Result<Ack, ApiError> {
        self.setup_requests.lock().unwrap().push(request.clone());
        self.call("complete_cycle_setup", &*self.complete_setup).await
    }

    async fn get_my_program(&self) -> Result<Program, ApiError> {
        self.call("get_my_program", &*self.my_program).await
    }

    async fn generate_program(&self) -> Result<Program, ApiError> {
        self.call("generate_program", &*self.generate).await
    }

    async fn regenerate_recommendations(&self) -> Result<Value, ApiError> {
        self.call("regenerate_recommendations", &*self.regenerate).await
    }

    async fn questionnaire_completions(&self) -> Result<Vec<QuestionnaireCompletion>, ApiError> {
        self.call("questionnaire_completions", &*self.completions).await
    }
}

/// Store with a session already in place.
pub async fn logged_in_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.store(keys::AUTH_TOKEN, "tok-123").await.unwrap();
    store.store(keys::USERNAME, "sam").await.unwrap();
    store
}

pub fn session(store: &Arc<MemoryStore>) -> Session {
    Session::new(store.clone())
}
