//! Configuration: store endpoint, credentials and simulated latencies
use crate::error::SentinelError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// Base URL of the hosted project store (REST + functions)
    pub store_url: String,
    /// Bearer credential sent to the store and its functions
    pub anon_key: String,
    /// Listen address of the functions API server
    pub listen_addr: String,
    /// Simulated latency of the main analysis call
    pub analysis_delay_ms: u64,
    /// Artificial delay of the performance suite
    pub perf_delay_ms: u64,
    /// Deadline after which the performance fallback is used
    pub perf_timeout_ms: u64,
    /// Simulated per-test execution time of the test runner
    pub test_step_delay_ms: u64,
    /// Directory exported reports are written to
    pub export_dir: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            store_url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            listen_addr: "0.0.0.0:8787".to_string(),
            analysis_delay_ms: 2000,
            perf_delay_ms: 1000,
            perf_timeout_ms: 5000,
            test_step_delay_ms: 100,
            export_dir: PathBuf::from("."),
            request_timeout_secs: 30,
        }
    }
}

impl SentinelConfig {
    /// Configuration with every simulated delay disabled
    pub fn immediate() -> Self {
        Self {
            analysis_delay_ms: 0,
            perf_delay_ms: 0,
            test_step_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Load configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, SentinelError> {
        serde_yaml::from_str(yaml).map_err(|e| SentinelError::Config(e.to_string()))
    }

    /// Defaults overridden by `SENTINEL_*` environment variables
    pub fn from_env() -> Result<Self, SentinelError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SentinelError> {
        let mut config = Self::default();

        if let Some(url) = lookup("SENTINEL_STORE_URL") {
            config.store_url = url;
        }
        if let Some(key) = lookup("SENTINEL_ANON_KEY") {
            config.anon_key = key;
        }
        if let Some(addr) = lookup("SENTINEL_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(dir) = lookup("SENTINEL_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }

        let numeric = |key: &str, target: &mut u64| -> Result<(), SentinelError> {
            if let Some(raw) = lookup(key) {
                *target = raw
                    .trim()
                    .parse()
                    .map_err(|_| SentinelError::Config(format!("{} must be an integer, got {:?}", key, raw)))?;
            }
            Ok(())
        };
        numeric("SENTINEL_ANALYSIS_DELAY_MS", &mut config.analysis_delay_ms)?;
        numeric("SENTINEL_PERF_DELAY_MS", &mut config.perf_delay_ms)?;
        numeric("SENTINEL_PERF_TIMEOUT_MS", &mut config.perf_timeout_ms)?;
        numeric("SENTINEL_TEST_STEP_DELAY_MS", &mut config.test_step_delay_ms)?;
        numeric("SENTINEL_REQUEST_TIMEOUT_SECS", &mut config.request_timeout_secs)?;

        Ok(config)
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn perf_delay(&self) -> Duration {
        Duration::from_millis(self.perf_delay_ms)
    }

    pub fn perf_timeout(&self) -> Duration {
        Duration::from_millis(self.perf_timeout_ms)
    }

    pub fn test_step_delay(&self) -> Duration {
        Duration::from_millis(self.test_step_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SentinelConfig::default();
        assert_eq!(config.perf_timeout_ms, 5000);
        assert_eq!(config.listen_addr, "0.0.0.0:8787");
    }

    #[test]
    fn test_partial_yaml() {
        let config = SentinelConfig::from_yaml("store_url: https://example.test\nperf_delay_ms: 5\n").unwrap();
        assert_eq!(config.store_url, "https://example.test");
        assert_eq!(config.perf_delay_ms, 5);
        assert_eq!(config.perf_timeout_ms, 5000);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SENTINEL_ANON_KEY", "secret"),
            ("SENTINEL_PERF_TIMEOUT_MS", "250"),
        ]
        .into_iter()
        .collect();

        let config = SentinelConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.anon_key, "secret");
        assert_eq!(config.perf_timeout_ms, 250);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let result = SentinelConfig::from_lookup(|k| {
            (k == "SENTINEL_PERF_DELAY_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(SentinelError::Config(_))));
    }
}
