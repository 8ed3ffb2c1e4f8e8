//! thermal.toml configuration parser.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working in-cluster configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtenderConfig {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub policy: PolicyConfig,
    pub decision: DecisionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Prefix for the extender routes. Empty or starting with `/`.
    pub base_path: String,
    pub filter_verb: String,
    pub prioritize_verb: String,
    /// Largest request body accepted. Full node lists for big clusters run to tens of MiB.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:4321".to_string(),
            base_path: "/thermalScheduler".to_string(),
            filter_verb: "filter/thermal".to_string(),
            prioritize_verb: "prioritize/thermal_score".to_string(),
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn filter_path(&self) -> String {
        join_route(&self.base_path, &self.filter_verb)
    }

    pub fn prioritize_path(&self) -> String {
        join_route(&self.base_path, &self.prioritize_verb)
    }
}

fn join_route(base: &str, verb: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        verb.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// API server base URL. When unset, the in-cluster service environment is used.
    pub api_server: Option<String>,
    pub api_prefix: String,
    pub metric_name: String,
    pub token_path: Option<String>,
    pub ca_path: Option<String>,
    pub insecure_skip_verify: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            api_server: None,
            api_prefix: "apis/custom.metrics.k8s.io/v1beta1".to_string(),
            metric_name: "node_thermal_zone_temp".to_string(),
            token_path: Some("/var/run/secrets/kubernetes.io/serviceaccount/token".to_string()),
            ca_path: Some("/var/run/secrets/kubernetes.io/serviceaccount/ca.crt".to_string()),
            insecure_skip_verify: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Hottest temperature (inclusive) a node may report and still be admitted.
    pub max_temperature_celsius: f64,
    pub min_score: i64,
    pub max_score: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_temperature_celsius: 40.0,
            min_score: 0,
            max_score: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Maximum in-flight metric fetches per request.
    pub concurrency: usize,
    pub fetch_timeout: String,
    pub request_timeout: String,
    /// Extra attempts for transient fetch failures.
    pub max_retries: u32,
    pub retry_backoff: String,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            fetch_timeout: "2s".to_string(),
            request_timeout: "10s".to_string(),
            max_retries: 1,
            retry_backoff: "50ms".to_string(),
        }
    }
}

impl DecisionConfig {
    pub fn fetch_timeout(&self) -> ConfigResult<Duration> {
        duration_field("decision.fetch_timeout", &self.fetch_timeout)
    }

    pub fn request_timeout(&self) -> ConfigResult<Duration> {
        duration_field("decision.request_timeout", &self.request_timeout)
    }

    pub fn retry_backoff(&self) -> ConfigResult<Duration> {
        duration_field("decision.retry_backoff", &self.retry_backoff)
    }
}

fn duration_field(field: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_duration(value).ok_or_else(|| ConfigError::Duration {
        field,
        value: value.to_string(),
    })
}

impl ExtenderConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ExtenderConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints the type system can't express.
    pub fn validate(&self) -> ConfigResult<()> {
        let base = &self.server.base_path;
        if !base.is_empty() && !base.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.base_path must start with '/': {base:?}"
            )));
        }
        if self.server.filter_path() == self.server.prioritize_path() {
            return Err(ConfigError::Invalid(
                "filter and prioritize routes must differ".to_string(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be non-zero".to_string(),
            ));
        }

        if self.metrics.metric_name.trim().is_empty() {
            return Err(ConfigError::Invalid("metrics.metric_name is empty".to_string()));
        }

        let policy = &self.policy;
        if !policy.max_temperature_celsius.is_finite() {
            return Err(ConfigError::Invalid(
                "policy.max_temperature_celsius must be finite".to_string(),
            ));
        }
        if policy.min_score > policy.max_score {
            return Err(ConfigError::Invalid(format!(
                "policy.min_score ({}) exceeds policy.max_score ({})",
                policy.min_score, policy.max_score
            )));
        }

        let decision = &self.decision;
        if decision.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "decision.concurrency must be at least 1".to_string(),
            ));
        }
        let fetch_timeout = decision.fetch_timeout()?;
        let request_timeout = decision.request_timeout()?;
        decision.retry_backoff()?;
        if fetch_timeout.is_zero() || request_timeout.is_zero() {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()));
        }
        if fetch_timeout > request_timeout {
            return Err(ConfigError::Invalid(format!(
                "decision.fetch_timeout ({}) exceeds decision.request_timeout ({})",
                decision.fetch_timeout, decision.request_timeout
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ExtenderConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExtenderConfig::default());
        assert_eq!(config.policy.max_temperature_celsius, 40.0);
        assert_eq!(config.metrics.metric_name, "node_thermal_zone_temp");
        assert_eq!(
            config.decision.fetch_timeout().unwrap(),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn default_routes() {
        let server = ServerConfig::default();
        assert_eq!(server.filter_path(), "/thermalScheduler/filter/thermal");
        assert_eq!(
            server.prioritize_path(),
            "/thermalScheduler/prioritize/thermal_score"
        );
    }

    #[test]
    fn routes_without_base_path() {
        let server = ServerConfig {
            base_path: String::new(),
            ..Default::default()
        };
        assert_eq!(server.filter_path(), "/filter/thermal");
    }

    #[test]
    fn parse_partial_sections() {
        let toml_str = r#"
[metrics]
api_server = "http://127.0.0.1:8001"
metric_name = "gpu_temp"

[policy]
max_temperature_celsius = 75.5

[decision]
concurrency = 4
fetch_timeout = "500ms"
"#;
        let config = ExtenderConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.metrics.api_server.as_deref(), Some("http://127.0.0.1:8001"));
        assert_eq!(config.metrics.metric_name, "gpu_temp");
        assert_eq!(config.metrics.api_prefix, "apis/custom.metrics.k8s.io/v1beta1");
        assert_eq!(config.policy.max_temperature_celsius, 75.5);
        assert_eq!(config.policy.max_score, 100);
        assert_eq!(config.decision.concurrency, 4);
        assert_eq!(
            config.decision.fetch_timeout().unwrap(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn rejects_inverted_score_range() {
        let err = ExtenderConfig::from_toml_str("[policy]\nmin_score = 10\nmax_score = 5\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = ExtenderConfig::from_toml_str("[decision]\nconcurrency = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_duration() {
        let err =
            ExtenderConfig::from_toml_str("[decision]\nrequest_timeout = \"forever\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Duration {
                field: "decision.request_timeout",
                ..
            }
        ));
    }

    #[test]
    fn rejects_fetch_timeout_above_request_timeout() {
        let toml_str = "[decision]\nfetch_timeout = \"20s\"\nrequest_timeout = \"10s\"\n";
        assert!(ExtenderConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn rejects_relative_base_path() {
        let err =
            ExtenderConfig::from_toml_str("[server]\nbase_path = \"thermal\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unparseable_toml() {
        let err = ExtenderConfig::from_toml_str("[policy\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
