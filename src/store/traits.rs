//! `SecureStore` trait: async key-value persistence for session state.

use async_trait::async_trait;

use crate::error::StoreError;

/// Well-known store keys.
pub mod keys {
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const USERNAME: &str = "username";
    pub const LAST_ONBOARDING_SCREEN: &str = "last_onboarding_screen";
}

/// Backend-agnostic key-value store that survives app restarts.
///
/// Implementations report failures honestly; the fail-open policy (log and
/// treat as absent) lives in the callers, see [`crate::store::Session`].
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Write `value` under `key`, replacing any previous value.
    async fn store(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read the value for `key`, `None` if never written or removed.
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
