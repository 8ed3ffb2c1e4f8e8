//! Custom metrics API client.
//!
//! Reads `{api_server}/{api_prefix}/nodes/{node}/{metric}` and decodes the
//! returned `MetricValueList`. The underlying `reqwest::Client` is built once
//! and pools connections, so one instance serves every request.

use std::time::Duration;

use tracing::debug;

use thermal_core::ThermalReading;
use thermal_core::config::MetricsConfig;

use crate::credentials::ClusterCredentials;
use crate::error::{MetricError, MetricResult};
use crate::payload::parse_temperature;
use crate::source::{FetchFuture, ThermalSource};

/// Longest node name the cluster accepts (DNS subdomain).
const MAX_NODE_NAME_LEN: usize = 253;

/// HTTP client for the per-node thermal metric.
#[derive(Debug, Clone)]
pub struct CustomMetricsClient {
    http: reqwest::Client,
    api_server: String,
    api_prefix: String,
    metric_name: String,
    bearer_token: Option<String>,
}

impl CustomMetricsClient {
    /// Build the client. Call once at startup.
    pub fn new(credentials: ClusterCredentials, config: &MetricsConfig) -> MetricResult<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("thermal-extender/", env!("CARGO_PKG_VERSION")));

        if let Some(pem) = &credentials.ca_pem {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|e| MetricError::Setup(format!("invalid CA bundle: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }
        if credentials.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| MetricError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_server: credentials.api_server.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix.trim_matches('/').to_string(),
            metric_name: config.metric_name.clone(),
            bearer_token: credentials.bearer_token,
        })
    }

    /// Resource URL for `node`'s metric.
    pub fn metric_url(&self, node: &str) -> MetricResult<String> {
        validate_node_name(node)?;
        Ok(format!(
            "{}/{}/nodes/{}/{}",
            self.api_server, self.api_prefix, node, self.metric_name
        ))
    }

    /// One live read of `node`'s temperature.
    pub async fn read(&self, node: &str) -> MetricResult<ThermalReading> {
        let url = self.metric_url(node)?;

        let mut request = self.http.get(&url).header("accept", "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            debug!(%node, error = %e, "metric request failed");
            MetricError::Fetch {
                node: node.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| MetricError::Fetch {
            node: node.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;

        if !status.is_success() {
            debug!(%node, %status, "metrics backend returned non-success");
            return Err(MetricError::Status {
                node: node.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let celsius = parse_temperature(node, &body)?;
        debug!(%node, celsius, "thermal metric read");
        Ok(ThermalReading::celsius(node, celsius))
    }
}

impl ThermalSource for CustomMetricsClient {
    fn fetch<'a>(&'a self, node: &'a str) -> FetchFuture<'a> {
        Box::pin(self.read(node))
    }
}

/// Node names go straight into a URL path, so only DNS subdomains pass:
/// dot-separated labels of lowercase alphanumerics and `-`, each starting
/// and ending with an alphanumeric.
fn validate_node_name(node: &str) -> MetricResult<()> {
    let valid = !node.is_empty()
        && node.len() <= MAX_NODE_NAME_LEN
        && node.split('.').all(is_dns_label);

    if valid {
        Ok(())
    } else {
        Err(MetricError::InvalidNode(node.to_string()))
    }
}

fn is_dns_label(label: &str) -> bool {
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    match (label.chars().next(), label.chars().last()) {
        (Some(first), Some(last)) => {
            alnum(first) && alnum(last) && label.chars().all(|c| alnum(c) || c == '-')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_server: &str) -> CustomMetricsClient {
        CustomMetricsClient::new(
            ClusterCredentials::anonymous(api_server),
            &MetricsConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn metric_url_follows_custom_metrics_layout() {
        let c = client("https://10.96.0.1:443/");
        assert_eq!(
            c.metric_url("worker-1").unwrap(),
            "https://10.96.0.1:443/apis/custom.metrics.k8s.io/v1beta1/nodes/worker-1/node_thermal_zone_temp"
        );
    }

    #[test]
    fn metric_url_rejects_unsafe_names() {
        let c = client("http://localhost:8001");
        assert!(matches!(c.metric_url(""), Err(MetricError::InvalidNode(_))));
        assert!(matches!(
            c.metric_url("../secrets"),
            Err(MetricError::InvalidNode(_))
        ));
        assert!(matches!(
            c.metric_url("node?x=1"),
            Err(MetricError::InvalidNode(_))
        ));
        assert!(c.metric_url(&"a".repeat(254)).is_err());
        for name in ["..", ".", "a..b", ".worker", "worker.", "-worker", "worker_1", "Worker-1"] {
            assert!(
                matches!(c.metric_url(name), Err(MetricError::InvalidNode(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn metric_url_accepts_dns_subdomains() {
        let c = client("http://localhost:8001");
        for name in ["worker-1", "n1", "ip-10-0-0-7.ec2.internal", "a"] {
            assert!(c.metric_url(name).is_ok(), "{name:?} should be accepted");
        }
    }
}
