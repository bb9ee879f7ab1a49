//! Configuration types for the relay server.
//!
//! All configuration is loaded from environment variables. The provider
//! credentials and the shared login password are required; without them
//! the process refuses to start. Everything else has a default.

use core::fmt::Display;
use core::str::FromStr;
use std::time::Duration;

use skywatch_provider::ProviderConfig;
use skywatch_tracker::{MIN_POLL_INTERVAL, TrackerConfig};

use crate::auth::SharedPassword;
use crate::server::ServerConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required env var {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be used.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// The offending variable.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Complete server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Provider connection settings.
    pub provider: ProviderConfig,
    /// Shared login password.
    pub password: SharedPassword,
    /// Bind address.
    pub server: ServerConfig,
    /// Poll cadence and fan-out buffer.
    pub tracker: TrackerConfig,
    /// How long a login stays valid.
    pub session_ttl: Duration,
    /// Whether the session cookie is marked `Secure`.
    pub secure_cookie: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `RAPIDAPI_KEY` -- provider API key
    /// - `RAPIDAPI_HOST` -- provider host
    /// - `APP_PASSWORD` -- shared login password
    ///
    /// Optional variables:
    /// - `SKYWATCH_PROVIDER_SCHEME` -- provider URL scheme (default `https`)
    /// - `SKYWATCH_HOST` -- bind host (default `0.0.0.0`)
    /// - `SKYWATCH_PORT` -- bind port (default 5000)
    /// - `SKYWATCH_POLL_INTERVAL_MS` -- tracking poll interval (default 1000, minimum 100)
    /// - `SKYWATCH_LOOKUP_TIMEOUT_MS` -- provider request timeout (default 10000)
    /// - `SKYWATCH_BROADCAST_CAPACITY` -- per-client update buffer (default 256)
    /// - `SKYWATCH_SESSION_TTL_SECS` -- login lifetime (default 43200)
    /// - `SKYWATCH_SECURE_COOKIE` -- mark the session cookie `Secure` (default `false`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_source<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&var, "RAPIDAPI_KEY")?;
        let api_host = required(&var, "RAPIDAPI_HOST")?;
        let password = SharedPassword::new(required(&var, "APP_PASSWORD")?);

        let scheme = var("SKYWATCH_PROVIDER_SCHEME").unwrap_or_else(|| "https".to_owned());
        if scheme != "https" && scheme != "http" {
            return Err(ConfigError::Invalid {
                name: "SKYWATCH_PROVIDER_SCHEME",
                reason: format!("expected http or https, got {scheme}"),
            });
        }

        let lookup_timeout_ms: u64 = parsed(&var, "SKYWATCH_LOOKUP_TIMEOUT_MS", 10_000)?;
        let host = var("SKYWATCH_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port: u16 = parsed(&var, "SKYWATCH_PORT", 5000)?;

        let poll_interval_ms: u64 = parsed(&var, "SKYWATCH_POLL_INTERVAL_MS", 1000)?;
        let poll_interval = Duration::from_millis(poll_interval_ms);
        if poll_interval < MIN_POLL_INTERVAL {
            return Err(ConfigError::Invalid {
                name: "SKYWATCH_POLL_INTERVAL_MS",
                reason: format!(
                    "must be at least {}ms, got {poll_interval_ms}ms",
                    MIN_POLL_INTERVAL.as_millis()
                ),
            });
        }

        let broadcast_capacity: usize = parsed(&var, "SKYWATCH_BROADCAST_CAPACITY", 256)?;
        if broadcast_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "SKYWATCH_BROADCAST_CAPACITY",
                reason: String::from("must be greater than zero"),
            });
        }

        let session_ttl_secs: u64 = parsed(&var, "SKYWATCH_SESSION_TTL_SECS", 43_200)?;
        let secure_cookie: bool = parsed(&var, "SKYWATCH_SECURE_COOKIE", false)?;

        Ok(Self {
            provider: ProviderConfig {
                api_key,
                api_host,
                scheme,
                timeout: Duration::from_millis(lookup_timeout_ms),
            },
            password,
            server: ServerConfig { host, port },
            tracker: TrackerConfig {
                poll_interval,
                broadcast_capacity,
            },
            session_ttl: Duration::from_secs(session_ttl_secs),
            secure_cookie,
        })
    }
}

/// Read a required, non-empty variable.
fn required<F>(var: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Read and parse an optional variable, falling back to `default`.
fn parsed<F, T>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    var(name).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })
    })
}
