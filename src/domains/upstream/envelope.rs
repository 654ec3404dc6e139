//! Response envelope returned by every company tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upstream payload plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Envelope {
    /// The upstream JSON body, untouched.
    pub data: Value,
    pub source: Provenance,
}

/// Which upstream call produced an envelope's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Provenance {
    /// Endpoint path relative to the upstream base URL.
    pub endpoint: String,
    /// Effective parameters sent upstream (query string or JSON body).
    pub params: Map<String, Value>,
    /// HTTP status of the response that produced `data`.
    pub status: u16,
}

impl Envelope {
    pub fn build(
        data: Value,
        endpoint: impl Into<String>,
        params: Map<String, Value>,
        status: u16,
    ) -> Self {
        Self {
            data,
            source: Provenance {
                endpoint: endpoint.into(),
                params,
                status,
            },
        }
    }

    /// The upstream answered with a 4xx/5xx status.
    pub fn is_upstream_error(&self) -> bool {
        self.source.status >= 400
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let mut params = Map::new();
        params.insert("since".to_string(), json!("2024-01-01T00:00:00Z"));

        let envelope = Envelope::build(
            json!([{ "field": "employees" }]),
            "/companies/acme01/updates",
            params,
            200,
        );

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "data": [{ "field": "employees" }],
                "source": {
                    "endpoint": "/companies/acme01/updates",
                    "params": { "since": "2024-01-01T00:00:00Z" },
                    "status": 200
                }
            })
        );
        assert!(!envelope.is_upstream_error());
    }

    #[test]
    fn test_upstream_error_status_is_flagged() {
        let envelope = Envelope::build(json!({ "error": "nope" }), "/me/limits", Map::new(), 429);
        assert!(envelope.is_upstream_error());
    }
}
