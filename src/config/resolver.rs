//! Precedence resolution for board configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. board.kdl in the repository's storage directory
//! 3. Built-in defaults

use crate::config::schema::{
    BoardConfig, DEFAULT_KEY_PREFIX, DEFAULT_STATE_FOR_UNKNOWN, DEFAULT_STATES, OutputFormat,
};
use crate::{Error, Result};

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from board.kdl
    File,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::File => write!(f, "file"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Force human-readable output (`-H`)
    pub human: bool,
}

/// Fully resolved board configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub states: Resolved<Vec<String>>,
    pub state_for_unknown: Resolved<String>,
    pub key_prefix: Resolved<String>,
    pub output_format: Resolved<OutputFormat>,
}

impl ResolvedConfig {
    pub fn states(&self) -> &[String] {
        &self.states.value
    }

    pub fn state_for_unknown(&self) -> &str {
        &self.state_for_unknown.value
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix.value
    }

    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    pub fn is_human(&self) -> bool {
        self.output_format.value == OutputFormat::Human
    }
}

fn pick<T>(file: Option<T>, default: T) -> Resolved<T> {
    match file {
        Some(value) => Resolved::new(value, ValueSource::File),
        None => Resolved::new(default, ValueSource::Default),
    }
}

/// Resolve the effective configuration from board.kdl and CLI overrides.
///
/// The file config is validated first, then the merged result, so a file
/// that names states without a fallback still gets a fallback that is one
/// of its states.
pub fn resolve_config(file: &BoardConfig, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    file.validate().map_err(Error::Config)?;

    let states = pick(
        file.states.clone(),
        DEFAULT_STATES.iter().map(|s| s.to_string()).collect(),
    );

    let state_for_unknown = match file.state_for_unknown.clone() {
        Some(value) => Resolved::new(value, ValueSource::File),
        None if states.value.iter().any(|s| s == DEFAULT_STATE_FOR_UNKNOWN) => {
            Resolved::new(DEFAULT_STATE_FOR_UNKNOWN.to_string(), ValueSource::Default)
        }
        // Custom states without a fallback: the leftmost column takes unassigned issues
        None => Resolved::new(states.value[0].clone(), ValueSource::Default),
    };

    if !states.value.contains(&state_for_unknown.value) {
        return Err(Error::Config(format!(
            "state-for-unknown \"{}\" must be one of the states",
            state_for_unknown.value
        )));
    }

    let key_prefix = pick(file.key_prefix.clone(), DEFAULT_KEY_PREFIX.to_string());

    let output_format = if overrides.human {
        Resolved::new(OutputFormat::Human, ValueSource::CliFlag)
    } else {
        pick(file.output_format.clone(), OutputFormat::Json)
    };

    Ok(ResolvedConfig {
        states,
        state_for_unknown,
        key_prefix,
        output_format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let resolved = resolve_config(&BoardConfig::default(), &ConfigOverrides::default()).unwrap();

        assert_eq!(resolved.states(), ["Backlog", "In Progress", "Done"]);
        assert_eq!(resolved.states.source, ValueSource::Default);
        assert_eq!(resolved.state_for_unknown(), "Backlog");
        assert_eq!(resolved.key_prefix(), "KAN");
        assert_eq!(resolved.output_format(), &OutputFormat::Json);
    }

    #[test]
    fn test_resolve_file_values() {
        let file = BoardConfig {
            states: Some(vec!["Todo".to_string(), "Done".to_string()]),
            state_for_unknown: Some("Done".to_string()),
            key_prefix: Some("OPS".to_string()),
            output_format: Some(OutputFormat::Human),
        };
        let resolved = resolve_config(&file, &ConfigOverrides::default()).unwrap();

        assert_eq!(resolved.states(), ["Todo", "Done"]);
        assert_eq!(resolved.state_for_unknown(), "Done");
        assert_eq!(resolved.state_for_unknown.source, ValueSource::File);
        assert_eq!(resolved.key_prefix(), "OPS");
        assert!(resolved.is_human());
    }

    #[test]
    fn test_resolve_custom_states_default_to_leftmost_fallback() {
        let file = BoardConfig {
            states: Some(vec!["Todo".to_string(), "Done".to_string()]),
            ..Default::default()
        };
        let resolved = resolve_config(&file, &ConfigOverrides::default()).unwrap();
        assert_eq!(resolved.state_for_unknown(), "Todo");
        assert_eq!(resolved.state_for_unknown.source, ValueSource::Default);
    }

    #[test]
    fn test_resolve_fallback_outside_default_states() {
        let file = BoardConfig {
            state_for_unknown: Some("Icebox".to_string()),
            ..Default::default()
        };
        let result = resolve_config(&file, &ConfigOverrides::default());
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Icebox")));
    }

    #[test]
    fn test_cli_flag_overrides_file_format() {
        let file = BoardConfig {
            output_format: Some(OutputFormat::Json),
            ..Default::default()
        };
        let resolved = resolve_config(&file, &ConfigOverrides { human: true }).unwrap();
        assert!(resolved.is_human());
        assert_eq!(resolved.output_format.source, ValueSource::CliFlag);
    }
}
