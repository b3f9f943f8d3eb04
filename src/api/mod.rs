//! Backend API access.
//!
//! - [`CompanionApi`]: the typed endpoint surface the rest of the crate uses
//! - [`ApiClient`]: the reqwest implementation that attaches the stored token
//! - [`types`]: request/response schemas, validated on decode

pub mod client;
pub mod provider;
pub mod types;

pub use client::{ApiClient, paths};
pub use provider::CompanionApi;
pub use types::*;
