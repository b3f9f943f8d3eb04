//! GERD Companion client core.
//!
//! Post-login routing, onboarding resumption, and program generation for the
//! companion app, over the backend's HTTP API.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod generation;
pub mod navigation;
pub mod onboarding;
pub mod routing;
pub mod store;

pub use app::CompanionApp;
pub use error::{Error, Result};
pub use navigation::Screen;
