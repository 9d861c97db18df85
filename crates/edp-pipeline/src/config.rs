//! Pipeline configuration
//!
//! All run-time settings come from `EDP_*` environment variables, resolved
//! once at process start into an immutable config object that is passed
//! explicitly into the orchestrator. Stages never read ambient state.

use std::env;
use std::time::Duration;

/// Per-stage retry policy. Explicit parameters, not framework defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt (budget of `max_retries + 1` attempts)
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_secs(120),
        }
    }
}

/// Main pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Key of the source feed object
    pub source_key: String,
    /// Prefix for stored artifacts
    pub output_prefix: String,
    /// Uniform per-stage retry policy
    pub retry: RetryConfig,
    /// Cadence of the `schedule` loop
    pub check_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_key: "events_data.json".to_string(),
            output_prefix: "transformed".to_string(),
            retry: RetryConfig::default(),
            check_interval: Duration::from_secs(86_400),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// - `EDP_SOURCE_KEY`: feed object key (default `events_data.json`)
    /// - `EDP_OUTPUT_PREFIX`: artifact prefix (default `transformed`)
    /// - `EDP_MAX_RETRIES`: per-stage retries (default 2)
    /// - `EDP_RETRY_DELAY_SECS`: delay between attempts (default 120)
    /// - `EDP_CHECK_INTERVAL_SECS`: schedule cadence (default 86400)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(key) = env::var("EDP_SOURCE_KEY") {
            config.source_key = key;
        }

        if let Ok(prefix) = env::var("EDP_OUTPUT_PREFIX") {
            config.output_prefix = prefix;
        }

        if let Ok(retries) = env::var("EDP_MAX_RETRIES") {
            config.retry.max_retries = retries.parse()?;
        }

        if let Ok(delay) = env::var("EDP_RETRY_DELAY_SECS") {
            config.retry.retry_delay = Duration::from_secs(delay.parse()?);
        }

        if let Ok(interval) = env::var("EDP_CHECK_INTERVAL_SECS") {
            config.check_interval = Duration::from_secs(interval.parse()?);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "EDP_SOURCE_KEY",
            "EDP_OUTPUT_PREFIX",
            "EDP_MAX_RETRIES",
            "EDP_RETRY_DELAY_SECS",
            "EDP_CHECK_INTERVAL_SECS",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = PipelineConfig::from_env().unwrap();

        assert_eq!(config.source_key, "events_data.json");
        assert_eq!(config.output_prefix, "transformed");
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.retry_delay, Duration::from_secs(120));
        assert_eq!(config.check_interval, Duration::from_secs(86_400));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("EDP_SOURCE_KEY", "feeds/events.json");
        std::env::set_var("EDP_MAX_RETRIES", "5");
        std::env::set_var("EDP_RETRY_DELAY_SECS", "1");

        let config = PipelineConfig::from_env().unwrap();
        assert_eq!(config.source_key, "feeds/events.json");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.retry_delay, Duration::from_secs(1));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_number_is_an_error() {
        clear_env();
        std::env::set_var("EDP_MAX_RETRIES", "lots");

        assert!(PipelineConfig::from_env().is_err());

        clear_env();
    }
}
