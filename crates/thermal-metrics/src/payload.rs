//! Custom metrics API response decoding.

use serde::Deserialize;

use crate::error::{MetricError, MetricResult};
use crate::quantity::parse_quantity_milli;

/// `custom.metrics.k8s.io` `MetricValueList`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValueList {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub api_version: String,
    pub items: Vec<MetricValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    #[serde(default)]
    pub described_object: ObjectReference,
    #[serde(default)]
    pub metric_name: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub value: QuantityValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
}

/// Quantities are normally strings, but some adapters emit bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuantityValue {
    Text(String),
    Number(f64),
}

impl QuantityValue {
    /// Degrees Celsius. Text quantities are read in milli-units and divided
    /// by 1000; bare numbers are already whole units.
    fn to_celsius(&self) -> Result<f64, String> {
        match self {
            QuantityValue::Text(s) => parse_quantity_milli(s).map(|milli| milli / 1000.0),
            QuantityValue::Number(n) if n.is_finite() => Ok(*n),
            QuantityValue::Number(n) => Err(format!("non-finite value {n}")),
        }
    }
}

/// Decode a backend payload for `node` into degrees Celsius.
///
/// Uses the item describing `node` when present, otherwise the first item.
/// The value is read in milli-units and divided by 1000.
pub fn parse_temperature(node: &str, raw: &[u8]) -> MetricResult<f64> {
    let parse_error = |reason: String| MetricError::Parse {
        node: node.to_string(),
        raw: String::from_utf8_lossy(raw).into_owned(),
        reason,
    };

    let list: MetricValueList =
        serde_json::from_slice(raw).map_err(|e| parse_error(e.to_string()))?;

    let item = list
        .items
        .iter()
        .find(|item| item.described_object.name == node)
        .or_else(|| list.items.first())
        .ok_or_else(|| parse_error("no metric items".to_string()))?;

    item.value.to_celsius().map_err(parse_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(items: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "kind": "MetricValueList",
            "apiVersion": "custom.metrics.k8s.io/v1beta1",
            "metadata": {"selfLink": "/apis/custom.metrics.k8s.io/v1beta1/nodes/n1/node_thermal_zone_temp"},
            "items": items
        }))
        .unwrap()
    }

    fn item(node: &str, value: serde_json::Value) -> serde_json::Value {
        json!({
            "describedObject": {"kind": "Node", "name": node, "apiVersion": "/v1"},
            "metricName": "node_thermal_zone_temp",
            "timestamp": "2024-05-01T10:00:00Z",
            "value": value,
            "selector": null
        })
    }

    #[test]
    fn milli_value_becomes_celsius() {
        let raw = payload(json!([item("n1", json!("45000m"))]));
        assert_eq!(parse_temperature("n1", &raw).unwrap(), 45.0);
    }

    #[test]
    fn milli_value_divides_exactly() {
        let raw = payload(json!([item("n1", json!("30019m"))]));
        assert_eq!(parse_temperature("n1", &raw).unwrap(), 30.019);

        for milli in [1u32, 30_019, 40_001, 99_999, 119_997] {
            let raw = payload(json!([item("n1", json!(format!("{milli}m")))]));
            assert_eq!(
                parse_temperature("n1", &raw).unwrap(),
                f64::from(milli) / 1000.0,
                "{milli}m"
            );
        }
    }

    #[test]
    fn whole_unit_value() {
        let raw = payload(json!([item("n1", json!("20"))]));
        assert_eq!(parse_temperature("n1", &raw).unwrap(), 20.0);
    }

    #[test]
    fn numeric_value() {
        let raw = payload(json!([item("n1", json!(38.5))]));
        assert_eq!(parse_temperature("n1", &raw).unwrap(), 38.5);
    }

    #[test]
    fn picks_item_for_requested_node() {
        let raw = payload(json!([
            item("other", json!("90000m")),
            item("n1", json!("30000m"))
        ]));
        assert_eq!(parse_temperature("n1", &raw).unwrap(), 30.0);
    }

    #[test]
    fn falls_back_to_first_item() {
        let raw = payload(json!([item("renamed", json!("41000m"))]));
        assert_eq!(parse_temperature("n1", &raw).unwrap(), 41.0);
    }

    #[test]
    fn field_order_does_not_matter() {
        let raw = br#"{"items":[{"value":"33000m","selector":null,"describedObject":{"name":"n1"}}]}"#;
        assert_eq!(parse_temperature("n1", raw).unwrap(), 33.0);
    }

    #[test]
    fn empty_items_is_parse_error() {
        let raw = payload(json!([]));
        let err = parse_temperature("n1", &raw).unwrap_err();
        assert!(matches!(err, MetricError::Parse { ref node, .. } if node == "n1"));
    }

    #[test]
    fn missing_items_is_parse_error() {
        let err = parse_temperature("n1", br#"{"kind":"Status","code":404}"#).unwrap_err();
        match err {
            MetricError::Parse { raw, .. } => assert!(raw.contains("Status")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn bad_quantity_is_parse_error() {
        let raw = payload(json!([item("n1", json!("warm"))]));
        assert!(matches!(
            parse_temperature("n1", &raw),
            Err(MetricError::Parse { .. })
        ));
    }

    #[test]
    fn non_json_is_parse_error() {
        assert!(matches!(
            parse_temperature("n1", b"<html>bad gateway</html>"),
            Err(MetricError::Parse { .. })
        ));
    }
}
