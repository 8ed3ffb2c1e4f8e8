//! API server address and credentials.
//!
//! Loaded once at startup and handed to [`crate::CustomMetricsClient`]; never
//! re-read per fetch.

use std::path::Path;

use tracing::debug;

use thermal_core::config::MetricsConfig;

use crate::error::{MetricError, MetricResult};

/// Everything needed to reach the metrics backend.
#[derive(Clone)]
pub struct ClusterCredentials {
    /// Base URL, e.g. `https://10.96.0.1:443` or `http://127.0.0.1:8001`.
    pub api_server: String,
    pub bearer_token: Option<String>,
    /// PEM bundle used to verify the API server.
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_verify: bool,
}

impl std::fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("api_server", &self.api_server)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("ca_pem", &self.ca_pem.as_ref().map(|pem| pem.len()))
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .finish()
    }
}

impl ClusterCredentials {
    /// Resolve credentials from config, falling back to the in-cluster
    /// service environment for the API server address.
    pub fn load(config: &MetricsConfig) -> MetricResult<Self> {
        Self::resolve(
            config,
            std::env::var("KUBERNETES_SERVICE_HOST").ok(),
            std::env::var("KUBERNETES_SERVICE_PORT").ok(),
        )
    }

    /// Credentials for a plain-HTTP endpoint with no auth (e.g. `kubectl proxy`).
    pub fn anonymous(api_server: impl Into<String>) -> Self {
        Self {
            api_server: api_server.into(),
            bearer_token: None,
            ca_pem: None,
            insecure_skip_verify: false,
        }
    }

    fn resolve(
        config: &MetricsConfig,
        service_host: Option<String>,
        service_port: Option<String>,
    ) -> MetricResult<Self> {
        let api_server = match (&config.api_server, service_host) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(host)) => {
                let port = service_port.unwrap_or_else(|| "443".to_string());
                if host.contains(':') {
                    format!("https://[{host}]:{port}")
                } else {
                    format!("https://{host}:{port}")
                }
            }
            (None, None) => {
                return Err(MetricError::Setup(
                    "no metrics.api_server configured and KUBERNETES_SERVICE_HOST is unset"
                        .to_string(),
                ));
            }
        };

        let bearer_token = read_optional(config.token_path.as_deref())?
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
            .filter(|token| !token.is_empty());
        let ca_pem = read_optional(config.ca_path.as_deref())?;

        Ok(Self {
            api_server,
            bearer_token,
            ca_pem,
            insecure_skip_verify: config.insecure_skip_verify,
        })
    }
}

/// Read a file if a path is configured and the file exists.
fn read_optional(path: Option<&str>) -> MetricResult<Option<Vec<u8>>> {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    match std::fs::read(Path::new(path)) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(%path, "credential file not present, skipping");
            Ok(None)
        }
        Err(e) => Err(MetricError::Setup(format!("failed to read {path}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_files() -> MetricsConfig {
        MetricsConfig {
            token_path: None,
            ca_path: None,
            ..Default::default()
        }
    }

    #[test]
    fn explicit_api_server_wins() {
        let config = MetricsConfig {
            api_server: Some("http://127.0.0.1:8001/".to_string()),
            ..no_files()
        };
        let creds = ClusterCredentials::resolve(
            &config,
            Some("10.96.0.1".to_string()),
            Some("443".to_string()),
        )
        .unwrap();
        assert_eq!(creds.api_server, "http://127.0.0.1:8001");
        assert!(creds.bearer_token.is_none());
    }

    #[test]
    fn in_cluster_environment() {
        let creds = ClusterCredentials::resolve(
            &no_files(),
            Some("10.96.0.1".to_string()),
            Some("6443".to_string()),
        )
        .unwrap();
        assert_eq!(creds.api_server, "https://10.96.0.1:6443");
    }

    #[test]
    fn ipv6_service_host_is_bracketed() {
        let creds =
            ClusterCredentials::resolve(&no_files(), Some("fd00::1".to_string()), None).unwrap();
        assert_eq!(creds.api_server, "https://[fd00::1]:443");
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let err = ClusterCredentials::resolve(&no_files(), None, None).unwrap_err();
        assert!(matches!(err, MetricError::Setup(_)));
    }

    #[test]
    fn missing_credential_files_are_skipped() {
        let config = MetricsConfig {
            api_server: Some("https://api.example:6443".to_string()),
            token_path: Some("/nonexistent/thermal/token".to_string()),
            ca_path: Some("/nonexistent/thermal/ca.crt".to_string()),
            ..Default::default()
        };
        let creds = ClusterCredentials::resolve(&config, None, None).unwrap();
        assert!(creds.bearer_token.is_none());
        assert!(creds.ca_pem.is_none());
    }

    #[test]
    fn token_file_is_read_and_trimmed() {
        let path = std::env::temp_dir().join(format!("thermal-token-{}", std::process::id()));
        std::fs::write(&path, "secret-token\n").unwrap();

        let config = MetricsConfig {
            api_server: Some("https://api.example:6443".to_string()),
            token_path: Some(path.to_string_lossy().into_owned()),
            ca_path: None,
            ..Default::default()
        };
        let creds = ClusterCredentials::resolve(&config, None, None).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(creds.bearer_token.as_deref(), Some("secret-token"));
        assert!(!format!("{creds:?}").contains("secret-token"));
    }
}
