// crates/fhir-bridge-client/src/query.rs
// ============================================================================
// Module: Query Serialization
// Description: Query-string builders for search and raw API requests.
// Purpose: Serialize caller-supplied parameter maps with the store's
// conventions.
// Dependencies: serde_json, url
// ============================================================================

//! ## Overview
//! Two serialization conventions exist side by side: FHIR search joins
//! repeated values for one parameter with commas (`status=final,amended`),
//! while the raw API passthrough repeats the key per value
//! (`status=final&status=amended`). Both percent-encode through
//! `form_urlencoded`.

use serde_json::Map;
use serde_json::Value;
use url::form_urlencoded;

/// Serializes search parameters; array values are comma-joined.
#[must_use]
pub fn search_query(params: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                let joined =
                    items.iter().map(scalar_text).collect::<Vec<_>>().join(",");
                serializer.append_pair(key, &joined);
            }
            other => {
                serializer.append_pair(key, &scalar_text(other));
            }
        }
    }
    serializer.finish()
}

/// Serializes raw API parameters; array values repeat the key.
#[must_use]
pub fn api_query(params: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                for item in items {
                    serializer.append_pair(key, &scalar_text(item));
                }
            }
            other => {
                serializer.append_pair(key, &scalar_text(other));
            }
        }
    }
    serializer.finish()
}

/// Renders a JSON value as query-parameter text.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use serde_json::Map;
    use serde_json::Value;
    use serde_json::json;

    use super::api_query;
    use super::search_query;

    /// Builds a parameter map from a JSON object literal.
    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn search_query_joins_arrays_with_commas() {
        let query = search_query(&params(json!({"status": ["final", "amended"]})));
        assert_eq!(query, "status=final%2Camended");
    }

    #[test]
    fn search_query_stringifies_scalars() {
        let query = search_query(&params(json!({"_count": 10, "active": true})));
        assert_eq!(query, "_count=10&active=true");
    }

    #[test]
    fn api_query_repeats_array_keys() {
        let query = api_query(&params(json!({"status": ["final", "amended"], "page": 2})));
        assert_eq!(query, "page=2&status=final&status=amended");
    }

    #[test]
    fn empty_params_serialize_to_empty_string() {
        assert_eq!(search_query(&Map::new()), "");
        assert_eq!(api_query(&Map::new()), "");
    }
}
