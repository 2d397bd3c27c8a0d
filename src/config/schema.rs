//! KDL schema for board.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation functions
//! - Default values

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// States used when board.kdl does not name any.
pub const DEFAULT_STATES: [&str; 3] = ["Backlog", "In Progress", "Done"];

/// Fallback state used when board.kdl does not name one.
pub const DEFAULT_STATE_FOR_UNKNOWN: &str = "Backlog";

/// Issue key prefix used when board.kdl does not name one.
pub const DEFAULT_KEY_PREFIX: &str = "KAN";

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Board layout and preferences stored in board.kdl.
///
/// Every field is optional so partial files merge over the defaults.
///
/// # KDL Schema
///
/// ```kdl
/// states "Backlog" "In Progress" "Done"
/// state-for-unknown "Backlog"
/// key-prefix "KAN"
/// output-format "human"  // or "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Workflow states, left to right
    pub states: Option<Vec<String>>,

    /// State that receives issues with no explicit placement
    pub state_for_unknown: Option<String>,

    /// Prefix for generated issue keys
    pub key_prefix: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,
}

impl BoardConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref states) = self.states {
            if states.is_empty() {
                return Err("states must name at least one state".to_string());
            }
            let mut seen = HashSet::new();
            for state in states {
                if state.trim().is_empty() {
                    return Err("state names must not be empty".to_string());
                }
                if !seen.insert(state.as_str()) {
                    return Err(format!("duplicate state \"{}\"", state));
                }
            }
            if let Some(ref fallback) = self.state_for_unknown {
                if !states.contains(fallback) {
                    return Err(format!(
                        "state-for-unknown \"{}\" must be one of the states",
                        fallback
                    ));
                }
            }
        }

        if let Some(ref prefix) = self.key_prefix {
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(format!(
                    "key-prefix must be non-empty and alphanumeric, got \"{}\"",
                    prefix
                ));
            }
        }

        Ok(())
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        // Every positional string argument is a state, in order
        if let Some(node) = doc.get("states") {
            let states: Vec<String> = node
                .entries()
                .iter()
                .filter(|e| e.name().is_none())
                .filter_map(|e| e.value().as_string())
                .map(str::to_string)
                .collect();
            config.states = Some(states);
        }

        config.state_for_unknown = get_string_arg(doc, "state-for-unknown");
        config.key_prefix = get_string_arg(doc, "key-prefix");
        config.output_format =
            get_string_arg(doc, "output-format").and_then(|s| OutputFormat::parse(&s));

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref states) = self.states {
            let mut node = KdlNode::new("states");
            for state in states {
                node.push(KdlEntry::new(KdlValue::String(state.clone())));
            }
            doc.nodes_mut().push(node);
        }

        if let Some(ref fallback) = self.state_for_unknown {
            push_string_node(&mut doc, "state-for-unknown", fallback);
        }

        if let Some(ref prefix) = self.key_prefix {
            push_string_node(&mut doc, "key-prefix", prefix);
        }

        if let Some(ref format) = self.output_format {
            push_string_node(&mut doc, "output-format", format.as_str());
        }

        doc.autoformat();
        doc
    }
}

fn get_string_arg(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
        .map(str::to_string)
}

fn push_string_node(doc: &mut KdlDocument, name: &str, value: &str) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    doc.nodes_mut().push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    // ==================== OutputFormat Tests ====================

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("HUMAN"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }

    // ==================== BoardConfig Tests ====================

    #[test]
    fn test_config_default_is_empty() {
        let config = BoardConfig::default();
        assert_eq!(config.states, None);
        assert_eq!(config.state_for_unknown, None);
        assert_eq!(config.key_prefix, None);
        assert_eq!(config.output_format, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_valid() {
        let config = BoardConfig {
            states: states(&["Todo", "Doing", "Done"]),
            state_for_unknown: Some("Doing".to_string()),
            key_prefix: Some("OPS".to_string()),
            output_format: Some(OutputFormat::Human),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_empty_states() {
        let config = BoardConfig {
            states: Some(Vec::new()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("at least one state"));
    }

    #[test]
    fn test_config_validate_duplicate_state() {
        let config = BoardConfig {
            states: states(&["Todo", "Done", "Todo"]),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("duplicate state"));
    }

    #[test]
    fn test_config_validate_fallback_outside_states() {
        let config = BoardConfig {
            states: states(&["Todo", "Done"]),
            state_for_unknown: Some("Icebox".to_string()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("state-for-unknown"));
    }

    #[test]
    fn test_config_validate_bad_prefix() {
        let config = BoardConfig {
            key_prefix: Some("K-N".to_string()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("key-prefix"));
    }

    #[test]
    fn test_config_from_kdl_full() {
        let kdl = r#"
            states "Todo" "In Review" "Done"
            state-for-unknown "Todo"
            key-prefix "OPS"
            output-format "human"
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let config = BoardConfig::from_kdl(&doc);

        assert_eq!(config.states, states(&["Todo", "In Review", "Done"]));
        assert_eq!(config.state_for_unknown, Some("Todo".to_string()));
        assert_eq!(config.key_prefix, Some("OPS".to_string()));
        assert_eq!(config.output_format, Some(OutputFormat::Human));
    }

    #[test]
    fn test_config_from_kdl_ignores_unknown_output_format() {
        let doc: KdlDocument = r#"output-format "xml""#.parse().unwrap();
        let config = BoardConfig::from_kdl(&doc);
        assert_eq!(config.output_format, None);
    }

    #[test]
    fn test_config_to_kdl_roundtrip() {
        let config = BoardConfig {
            states: states(&["Backlog", "In Progress", "Done"]),
            state_for_unknown: Some("Backlog".to_string()),
            key_prefix: Some("KAN".to_string()),
            output_format: Some(OutputFormat::Json),
        };

        let text = config.to_kdl().to_string();
        let doc: KdlDocument = text.parse().unwrap();
        assert_eq!(BoardConfig::from_kdl(&doc), config);
    }
}
