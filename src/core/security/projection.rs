use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::config::Config;

/// Filters requested output fields against the configured allowlist.
///
/// Unknown fields are silently dropped, never rejected. An empty result is
/// reported as "no projection" so the upstream falls back to its default
/// field set.
#[derive(Debug, Clone)]
pub struct FieldProjection {
    allowed: Arc<BTreeSet<String>>,
}

impl FieldProjection {
    /// Create a sanitizer for the given allowlist.
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: Arc::new(allowed.into_iter().collect()),
        }
    }

    /// Create a sanitizer from the server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.projection.allowed_fields.iter().cloned())
    }

    /// Whether `field` may be requested.
    pub fn is_allowed(&self, field: &str) -> bool {
        self.allowed.contains(field)
    }

    /// Keep only allowlisted fields, preserving the caller's order.
    ///
    /// Returns `None` when nothing was requested or nothing survived.
    pub fn sanitize(&self, requested: Option<&[String]>) -> Option<Vec<String>> {
        let kept: Vec<String> = requested?
            .iter()
            .filter(|f| self.is_allowed(f))
            .cloned()
            .collect();

        if kept.is_empty() { None } else { Some(kept) }
    }

    /// Sanitize and join with commas, as the upstream expects in query strings.
    pub fn sanitize_csv(&self, requested: Option<&[String]>) -> Option<String> {
        self.sanitize(requested).map(|fields| fields.join(","))
    }
}
