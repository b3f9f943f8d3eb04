//! Configuration types.
//!
//! Everything is read from environment variables. The `from_lookup`
//! constructors take the lookup as a closure so tests never touch the
//! process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Client configuration: where the backend lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Fixed per-request timeout.
    pub request_timeout: Duration,
    /// Location of the file-backed secure store.
    pub store_path: PathBuf,
    /// How often the cycle watcher asks the server for cycle status.
    pub cycle_check_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(15),
            store_path: default_store_path(),
            cycle_check_interval: Duration::from_secs(3600), // 1 hour
        }
    }
}

fn default_store_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".gerd-companion/secure-store.json")
}

impl ClientConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("GERD_API_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.base_url);
        if reqwest::Url::parse(&base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "GERD_API_BASE_URL".to_string(),
                message: format!("not a valid URL: {base_url}"),
            });
        }

        let request_timeout = parse_nonzero_duration(
            &lookup,
            "GERD_REQUEST_TIMEOUT_SECS",
            Duration::from_secs,
            defaults.request_timeout,
        )?;
        let store_path = lookup("GERD_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);
        let cycle_check_interval = parse_nonzero_duration(
            &lookup,
            "GERD_CYCLE_CHECK_INTERVAL_SECS",
            Duration::from_secs,
            defaults.cycle_check_interval,
        )?;

        Ok(Self {
            base_url,
            request_timeout,
            store_path,
            cycle_check_interval,
        })
    }
}

/// Generation poller timing and retry configuration.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Total workflow attempts (first try plus retries).
    pub max_attempts: u32,
    /// Fixed delay between workflow attempts.
    pub retry_delay: Duration,
    /// Safety ceiling: navigation is forced once this elapses.
    pub ceiling: Duration,
    /// The progress screen is shown at least this long.
    pub min_display: Duration,
    /// When the manual "force completion" button becomes visible.
    pub recovery_reveal_after: Duration,
    /// How often the progress phrase rotates.
    pub phrase_interval: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            ceiling: Duration::from_secs(45),
            min_display: Duration::from_secs(3),
            recovery_reveal_after: Duration::from_secs(20),
            phrase_interval: Duration::from_millis(2500),
        }
    }
}

impl GenerationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_attempts = match lookup("GERD_GENERATION_MAX_ATTEMPTS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "GERD_GENERATION_MAX_ATTEMPTS".to_string(),
                        message: format!("expected a positive integer, got {raw:?}"),
                    });
                }
            },
            None => defaults.max_attempts,
        };

        Ok(Self {
            max_attempts,
            retry_delay: parse_duration(
                &lookup,
                "GERD_GENERATION_RETRY_DELAY_MS",
                Duration::from_millis,
                defaults.retry_delay,
            )?,
            ceiling: parse_nonzero_duration(
                &lookup,
                "GERD_GENERATION_CEILING_SECS",
                Duration::from_secs,
                defaults.ceiling,
            )?,
            min_display: parse_duration(
                &lookup,
                "GERD_GENERATION_MIN_DISPLAY_MS",
                Duration::from_millis,
                defaults.min_display,
            )?,
            recovery_reveal_after: parse_duration(
                &lookup,
                "GERD_GENERATION_RECOVERY_REVEAL_SECS",
                Duration::from_secs,
                defaults.recovery_reveal_after,
            )?,
            phrase_interval: parse_duration(
                &lookup,
                "GERD_GENERATION_PHRASE_INTERVAL_MS",
                Duration::from_millis,
                defaults.phrase_interval,
            )?,
        })
    }
}

fn parse_duration<F>(
    lookup: &F,
    key: &str,
    unit: fn(u64) -> Duration,
    default: Duration,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(unit)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
        None => Ok(default),
    }
}

/// Like [`parse_duration`], for keys where zero is meaningless.
fn parse_nonzero_duration<F>(
    lookup: &F,
    key: &str,
    unit: fn(u64) -> Duration,
    default: Duration,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_duration(lookup, key, unit, default)?;
    if value.is_zero() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
