//! Common test utilities for kanban integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/kanban/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates two temporary directories:
/// - `repo_dir`: Acts as the repository root (passed via `KB_REPO`)
/// - `data_dir`: Holds board data (via `KB_DATA_DIR`)
///
/// Both are set per command, making tests parallel-safe.
pub struct TestEnv {
    pub repo_dir: TempDir,
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            repo_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment with a default board.
    pub fn init() -> Self {
        let env = Self::new();
        env.kb().arg("init").assert().success();
        env
    }

    /// Get a Command for the kb binary with isolated directories.
    pub fn kb(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kb"));
        cmd.current_dir(self.repo_dir.path());
        cmd.env("KB_REPO", self.repo_dir.path());
        cmd.env("KB_DATA_DIR", self.data_dir.path());
        cmd.env_remove("KB_LOG");
        cmd
    }

    /// Run kb with `args` and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.kb().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "kb {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Keys shown in the column for `state`, in order.
    pub fn column_keys(&self, state: &str) -> Vec<String> {
        let board = self.json(&["board"]);
        board["columns"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["state"] == state)
            .unwrap_or_else(|| panic!("no column {}", state))["issues"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["key"].as_str().unwrap().to_string())
            .collect()
    }

    pub fn repo_path(&self) -> &std::path::Path {
        self.repo_dir.path()
    }

    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
