//! Document configuration.
//!
//! Settings for the in-memory [`Document`](crate::render::Document). Every
//! field has a default, so a partial (or empty) JSON object is valid.
//!
//! ```rust
//! use ripple_core::config::DocumentConfig;
//!
//! let config = DocumentConfig::from_json(r#"{ "container_id": "app" }"#).unwrap();
//! assert_eq!(config.root_tag, "body");
//! assert_eq!(config.container_id.as_deref(), Some("app"));
//! ```

use serde::{Deserialize, Serialize};

/// Settings for a [`Document`](crate::render::Document).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Tag of the root element.
    pub root_tag: String,

    /// If set, a `<div>` with this id is created under the root, ready to
    /// mount into with the selector `#<id>`.
    pub container_id: Option<String>,

    /// Record every host operation in the mutation journal.
    pub record_mutations: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            root_tag: "body".to_string(),
            container_id: None,
            record_mutations: true,
        }
    }
}

impl DocumentConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convenience: default settings with an `#<id>` container.
    pub fn with_container(id: impl Into<String>) -> Self {
        Self {
            container_id: Some(id.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(DocumentConfig::from_json("{}").unwrap(), DocumentConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config =
            DocumentConfig::from_json(r#"{ "root_tag": "main", "record_mutations": false }"#).unwrap();
        assert_eq!(config.root_tag, "main");
        assert!(!config.record_mutations);
        assert!(config.container_id.is_none());
    }
}
