//! Kanban - an issue board library.
//!
//! This library provides the core functionality for the `kb` CLI tool:
//! projecting issues onto workflow-state columns, looking up adjacent states
//! for transitions, and applying board events to immutable snapshots.

pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod render;
pub mod storage;
pub mod store;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use tempfile::TempDir;

    use crate::config::BoardConfig;
    use crate::storage::Storage;

    /// Test environment with isolated storage using dependency injection.
    pub struct TestEnv {
        /// Simulated repository directory
        pub repo_dir: TempDir,
        /// Isolated data storage directory
        pub data_dir: TempDir,
    }

    impl TestEnv {
        pub fn new() -> Self {
            Self {
                repo_dir: TempDir::new().unwrap(),
                data_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the simulated repository.
        pub fn path(&self) -> &Path {
            self.repo_dir.path()
        }

        /// Get the path to the isolated data directory.
        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        /// Initialize storage with the default board configuration.
        pub fn init_storage(&self) -> Storage {
            Storage::init_with_data_dir(self.path(), self.data_path(), &BoardConfig::default())
                .unwrap()
        }

        /// Open storage for this test environment.
        pub fn open_storage(&self) -> Storage {
            Storage::open_with_data_dir(self.path(), self.data_path()).unwrap()
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for board operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("KDL error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error("Not initialized: run `kb init` first")]
    NotInitialized,

    #[error("Board already initialized at {0}")]
    AlreadyInitialized(String),

    /// Broken board configuration: the fallback state or a state column is
    /// missing where the board requires it.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A board column references an issue key with no issue record.
    #[error("Issue {key} is placed in state \"{state}\" but has no issue record")]
    UnknownIssue { key: String, state: String },

    #[error("Issue not found: {0}")]
    NotFound(String),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("State \"{to}\" is not adjacent to \"{from}\"")]
    NotAdjacent { from: String, to: String },

    #[error("Issue already exists: {0}")]
    DuplicateIssue(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for board operations.
pub type Result<T> = std::result::Result<T, Error>;
