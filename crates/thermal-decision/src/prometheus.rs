//! Prometheus text exposition format.

use crate::stats::StatsSnapshot;

/// Render decision counters into Prometheus text format.
pub fn render_prometheus(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();

    out.push_str("# HELP thermal_extender_requests_total Extender calls handled, by operation.\n");
    out.push_str("# TYPE thermal_extender_requests_total counter\n");
    out.push_str(&format!(
        "thermal_extender_requests_total{{operation=\"filter\"}} {}\n",
        snapshot.filter_requests
    ));
    out.push_str(&format!(
        "thermal_extender_requests_total{{operation=\"prioritize\"}} {}\n",
        snapshot.prioritize_requests
    ));

    out.push_str("# HELP thermal_extender_filter_nodes_total Filter verdicts, by outcome.\n");
    out.push_str("# TYPE thermal_extender_filter_nodes_total counter\n");
    out.push_str(&format!(
        "thermal_extender_filter_nodes_total{{outcome=\"admitted\"}} {}\n",
        snapshot.nodes_admitted
    ));
    out.push_str(&format!(
        "thermal_extender_filter_nodes_total{{outcome=\"too_hot\"}} {}\n",
        snapshot.nodes_rejected_hot
    ));

    out.push_str(
        "# HELP thermal_extender_unavailable_readings_total Nodes evaluated without a usable reading, by cause.\n",
    );
    out.push_str("# TYPE thermal_extender_unavailable_readings_total counter\n");
    for (cause, value) in [
        ("fetch", snapshot.unavailable_fetch),
        ("parse", snapshot.unavailable_parse),
        ("timeout", snapshot.unavailable_timeout),
    ] {
        out.push_str(&format!(
            "thermal_extender_unavailable_readings_total{{cause=\"{cause}\"}} {value}\n"
        ));
    }

    out.push_str(
        "# HELP thermal_extender_orchestration_timeouts_total Requests failed on the request deadline.\n",
    );
    out.push_str("# TYPE thermal_extender_orchestration_timeouts_total counter\n");
    out.push_str(&format!(
        "thermal_extender_orchestration_timeouts_total {}\n",
        snapshot.orchestration_timeouts
    ));

    out.push_str("# HELP thermal_extender_malformed_requests_total Request bodies rejected as malformed.\n");
    out.push_str("# TYPE thermal_extender_malformed_requests_total counter\n");
    out.push_str(&format!(
        "thermal_extender_malformed_requests_total {}\n",
        snapshot.malformed_requests
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_snapshot() -> StatsSnapshot {
        StatsSnapshot {
            filter_requests: 12,
            prioritize_requests: 10,
            nodes_admitted: 30,
            nodes_rejected_hot: 4,
            unavailable_fetch: 2,
            unavailable_parse: 1,
            unavailable_timeout: 3,
            orchestration_timeouts: 1,
            malformed_requests: 5,
        }
    }

    #[test]
    fn render_empty() {
        let output = render_prometheus(&StatsSnapshot::default());
        assert!(output.contains("# TYPE thermal_extender_requests_total counter"));
        assert!(output.contains("thermal_extender_requests_total{operation=\"filter\"} 0"));
    }

    #[test]
    fn render_values() {
        let output = render_prometheus(&test_snapshot());

        assert!(output.contains("thermal_extender_requests_total{operation=\"filter\"} 12"));
        assert!(output.contains("thermal_extender_requests_total{operation=\"prioritize\"} 10"));
        assert!(output.contains("thermal_extender_filter_nodes_total{outcome=\"admitted\"} 30"));
        assert!(output.contains("thermal_extender_filter_nodes_total{outcome=\"too_hot\"} 4"));
        assert!(output.contains("thermal_extender_unavailable_readings_total{cause=\"timeout\"} 3"));
        assert!(output.contains("thermal_extender_orchestration_timeouts_total 1"));
        assert!(output.contains("thermal_extender_malformed_requests_total 5"));
    }

    #[test]
    fn render_format_is_prometheus_compatible() {
        let output = render_prometheus(&test_snapshot());

        // Every sample line is `name[{labels}] value`.
        for line in output.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.rsplitn(2, ' ');
            let value = parts.next().unwrap();
            assert!(value.parse::<u64>().is_ok(), "bad value in line: {line}");
            assert!(parts.next().is_some_and(|name| name.starts_with("thermal_extender_")));
        }
    }
}
