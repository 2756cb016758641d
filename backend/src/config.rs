//! Ingestion settings loaded via OrthoConfig.
//!
//! Values come from `VENUES_*` environment variables (or a configuration
//! file); every tuning knob falls back to a built-in default.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::RetryPolicy;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_MIN_IDLE: u32 = 2;
const DEFAULT_POOL_TIMEOUT_SECS: u64 = 30;

/// Tuning values for the ingestion driver.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VENUES")]
pub struct IngestSettings {
    /// Emit logs as JSON lines instead of human-readable text.
    #[ortho_config(default = false)]
    pub log_json: bool,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections kept open; zero disables the idle floor.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
    /// Attempts per record for transient store failures, including the first.
    pub retry_max_attempts: Option<u32>,
    /// Delay before the first retry, in milliseconds.
    pub retry_initial_backoff_ms: Option<u64>,
    /// Upper bound on any retry delay, in milliseconds.
    pub retry_max_backoff_ms: Option<u64>,
}

impl IngestSettings {
    /// Pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Idle connection floor, falling back to the default.
    ///
    /// A configured zero means no idle connections are kept.
    pub fn pool_min_idle(&self) -> Option<u32> {
        match self.pool_min_idle {
            Some(0) => None,
            Some(idle) => Some(idle),
            None => Some(DEFAULT_POOL_MIN_IDLE),
        }
    }

    /// Connection checkout timeout, falling back to the default.
    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_secs.unwrap_or(DEFAULT_POOL_TIMEOUT_SECS))
    }

    /// Pool configuration for `database_url` with these settings applied.
    pub fn pool_config(&self, database_url: impl Into<String>) -> PoolConfig {
        PoolConfig::new(database_url)
            .with_max_size(self.pool_max_size())
            .with_min_idle(self.pool_min_idle())
            .with_connection_timeout(self.pool_timeout())
    }

    /// Retry policy with any configured overrides applied.
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.retry_max_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff: self
                .retry_initial_backoff_ms
                .map_or(defaults.initial_backoff, Duration::from_millis),
            max_backoff: self
                .retry_max_backoff_ms
                .map_or(defaults.max_backoff, Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for ingestion settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 7] = [
        "VENUES_LOG_JSON",
        "VENUES_POOL_MAX_SIZE",
        "VENUES_POOL_MIN_IDLE",
        "VENUES_POOL_TIMEOUT_SECS",
        "VENUES_RETRY_MAX_ATTEMPTS",
        "VENUES_RETRY_INITIAL_BACKOFF_MS",
        "VENUES_RETRY_MAX_BACKOFF_MS",
    ];

    fn load_from_empty_args() -> IngestSettings {
        IngestSettings::load_from_iter([OsString::from("ingest-venues")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();
        assert!(!settings.log_json);
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert_eq!(settings.pool_timeout(), Duration::from_secs(30));
        assert_eq!(settings.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.pool_min_idle(), Some(2));
        let pool = settings.pool_config("postgres://localhost/venues");
        assert_eq!(pool.max_size(), 10);
        assert_eq!(pool.min_idle(), Some(2));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("VENUES_LOG_JSON", Some("true".to_owned())),
            ("VENUES_POOL_MAX_SIZE", Some("4".to_owned())),
            ("VENUES_POOL_MIN_IDLE", Some("9".to_owned())),
            ("VENUES_POOL_TIMEOUT_SECS", Some("5".to_owned())),
            ("VENUES_RETRY_MAX_ATTEMPTS", Some("6".to_owned())),
            ("VENUES_RETRY_INITIAL_BACKOFF_MS", Some("50".to_owned())),
            ("VENUES_RETRY_MAX_BACKOFF_MS", Some("800".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.log_json);
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.pool_timeout(), Duration::from_secs(5));
        assert_eq!(settings.pool_min_idle(), Some(9));
        assert_eq!(
            settings.pool_config("postgres://localhost/venues").min_idle(),
            Some(4),
            "idle floor is clamped to the pool size"
        );
        assert_eq!(
            settings.retry_policy(),
            RetryPolicy {
                max_attempts: 6,
                initial_backoff: Duration::from_millis(50),
                max_backoff: Duration::from_millis(800),
            }
        );
    }

    #[rstest]
    fn zero_min_idle_disables_the_idle_floor() {
        let _guard = lock_env(KEYS.map(|key| {
            let value = (key == "VENUES_POOL_MIN_IDLE").then(|| "0".to_owned());
            (key, value)
        }));

        let settings = load_from_empty_args();
        assert_eq!(settings.pool_min_idle(), None);
        assert_eq!(
            settings.pool_config("postgres://localhost/venues").min_idle(),
            None
        );
    }
}
