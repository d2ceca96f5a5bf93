//! JSON parser for the ArcGIS feature-service case feed.

use serde_json::{Map, Value};

use crate::error::{DashboardError, Result};

/// One location-observation exactly as the feed delivered it.
///
/// Attributes are kept loosely typed; callers check presence per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    attributes: Map<String, Value>,
}

impl RawRecord {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// Returns the attribute under `key`, treating JSON `null` as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }
}

/// Decodes a feed response body into its [`RawRecord`]s, in feed order.
///
/// # Errors
///
/// Returns [`DashboardError::MalformedFeed`] if the body is not JSON, if the
/// top-level `features` key is missing or not a list, or if an element has
/// no `attributes` object.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let body: Value = serde_json::from_slice(bytes)
        .map_err(|e| DashboardError::MalformedFeed(format!("body is not valid JSON: {e}")))?;

    let features = body
        .get("features")
        .ok_or_else(|| DashboardError::MalformedFeed("missing top-level 'features' key".into()))?
        .as_array()
        .ok_or_else(|| DashboardError::MalformedFeed("'features' is not a list".into()))?;

    features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            feature
                .get("attributes")
                .and_then(Value::as_object)
                .map(|attrs| RawRecord::new(attrs.clone()))
                .ok_or_else(|| {
                    DashboardError::MalformedFeed(format!(
                        "feature {i} has no 'attributes' object"
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_features() {
        let records = parse_feed(br#"{"features": []}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_extracts_attributes_in_order() {
        let body = br#"{"features": [
            {"attributes": {"Country_Region": "Italy", "Confirmed": 10}},
            {"attributes": {"Country_Region": "Spain", "Province_State": null}}
        ]}"#;
        let records = parse_feed(body).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get_str("Country_Region"), Some("Italy"));
        assert_eq!(records[0].get_f64("Confirmed"), Some(10.0));
        assert_eq!(records[1].get_str("Country_Region"), Some("Spain"));
        assert!(records[1].get("Province_State").is_none());
    }

    #[test]
    fn test_parse_missing_features_key() {
        let result = parse_feed(br#"{"error": {"code": 400}}"#);
        assert!(matches!(result, Err(DashboardError::MalformedFeed(_))));
    }

    #[test]
    fn test_parse_features_not_a_list() {
        let result = parse_feed(br#"{"features": {"attributes": {}}}"#);
        assert!(matches!(result, Err(DashboardError::MalformedFeed(_))));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_feed(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(DashboardError::MalformedFeed(_))));
    }

    #[test]
    fn test_parse_feature_without_attributes() {
        let result = parse_feed(br#"{"features": [{"geometry": {}}]}"#);
        assert!(matches!(result, Err(DashboardError::MalformedFeed(_))));
    }
}
