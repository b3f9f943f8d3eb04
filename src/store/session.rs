//! Session access over a [`SecureStore`], with the fail-open policy applied.
//!
//! Store failures never propagate from here: a failed read is logged and
//! reported as "no value", which at worst sends the user back to login.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::store::traits::{SecureStore, keys};

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SecureStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SecureStore> {
        &self.store
    }

    /// Read a key, treating failures and empty values as absent.
    pub async fn read(&self, key: &str) -> Option<String> {
        match self.store.read(key).await {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                warn!(key, error = %e, "Secure store read failed; treating as absent");
                None
            }
        }
    }

    /// Write a key. Returns whether the write succeeded.
    pub async fn write(&self, key: &str, value: &str) -> bool {
        match self.store.store(key, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Secure store write failed");
                false
            }
        }
    }

    /// Remove a key. Returns whether the removal succeeded.
    pub async fn remove(&self, key: &str) -> bool {
        match self.store.remove(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Secure store remove failed");
                false
            }
        }
    }

    /// The current auth token, resolved from the store on every call.
    pub async fn token(&self) -> Option<SecretString> {
        self.read(keys::AUTH_TOKEN).await.map(SecretString::from)
    }

    pub async fn has_token(&self) -> bool {
        self.token().await.is_some()
    }

    pub async fn username(&self) -> Option<String> {
        self.read(keys::USERNAME).await
    }

    /// Persist a freshly issued token and the username that obtained it.
    pub async fn begin(&self, token: &SecretString, username: &str) -> bool {
        let stored = self.write(keys::AUTH_TOKEN, token.expose_secret()).await;
        self.write(keys::USERNAME, username).await;
        stored
    }

    /// Drop the token and username. The onboarding marker is kept so a
    /// re-login resumes where the user left off.
    pub async fn clear(&self) {
        self.remove(keys::AUTH_TOKEN).await;
        self.remove(keys::USERNAME).await;
    }
}
