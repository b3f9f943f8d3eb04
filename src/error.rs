//! Error types for the companion client core.

use std::time::Duration;

/// Top-level error type for the client core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("No authenticated session")]
    Unauthenticated,
}

impl Error {
    /// Text suitable for showing to the user on a screen.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Unauthenticated => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Config(_) | Self::Store(_) => GENERIC_MESSAGE.to_string(),
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Local secure store errors. Callers log these and treat the value as absent.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted store file {path}: {reason}")]
    Corrupted { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub(crate) const NETWORK_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";
pub(crate) const SESSION_EXPIRED_MESSAGE: &str =
    "Your session has expired. Please sign in again.";
pub(crate) const SERVER_MESSAGE: &str =
    "Something went wrong on our side. Please try again later.";
pub(crate) const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failures from the backend HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connect failure, timeout, broken body stream).
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// The request exceeded the configured timeout.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The server answered with status >= 400.
    #[error("HTTP {status}: {}", body_preview(.body))]
    Http {
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// The response did not match the expected schema.
    #[error("Invalid response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

fn body_preview(body: &Option<serde_json::Value>) -> String {
    match body {
        Some(v) => v.to_string().chars().take(200).collect(),
        None => "<empty>".to_string(),
    }
}

impl ApiError {
    /// Status code for HTTP failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures where no response arrived.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// The session token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Server-provided validation text, if the error body carries one.
    ///
    /// Looks at `detail`, `error`, `message`, `non_field_errors`, then the
    /// first field-level error list.
    pub fn server_message(&self) -> Option<String> {
        let Self::Http {
            body: Some(body), ..
        } = self
        else {
            return None;
        };
        match body {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Object(map) => {
                for key in ["detail", "error", "message", "non_field_errors"] {
                    if let Some(text) = map.get(key).and_then(first_text) {
                        return Some(text);
                    }
                }
                map.iter().find_map(|(field, v)| {
                    first_text(v).map(|text| format!("{field}: {text}"))
                })
            }
            _ => None,
        }
    }

    /// User-facing text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => NETWORK_MESSAGE.to_string(),
            Self::Http { status: 401, .. } => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Http { status, .. } if *status >= 500 => SERVER_MESSAGE.to_string(),
            Self::Http { .. } => self
                .server_message()
                .unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
            Self::Decode { .. } => GENERIC_MESSAGE.to_string(),
        }
    }
}

fn first_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

/// Result type alias for the client core.
pub type Result<T> = std::result::Result<T, Error>;
