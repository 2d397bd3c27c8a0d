//! Board configuration.
//!
//! ## board.kdl - Board layout and preferences
//!
//! Located in the repository's storage directory
//! (`~/.local/share/kanban/<repo-hash>/board.kdl`, or `$KB_DATA_DIR/board.kdl`).
//!
//! Contains:
//! - `states` - Workflow states, left to right
//! - `state-for-unknown` - Column that receives issues with no placement
//! - `key-prefix` - Prefix for generated issue keys
//! - `output-format` - "json" or "human"
//!
//! ## Precedence
//!
//! CLI flag > board.kdl > defaults. Use the [`resolver`] module.

pub mod resolver;
pub mod schema;

pub use resolver::{ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve_config};
pub use schema::{BoardConfig, OutputFormat};
