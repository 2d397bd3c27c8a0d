//! Storage layer for board data.
//!
//! Each repository gets its own directory at
//! `~/.local/share/kanban/<repo-hash>/` (or `$KB_DATA_DIR/<repo-hash>/`):
//!
//! - `board.kdl` - board layout and preferences (see [`crate::config`])
//! - `board.json` - the current board snapshot
//! - `events.jsonl` - append-only history of applied events

use crate::config::{BoardConfig, ConfigOverrides, resolve_config};
use crate::store::{BoardState, Event};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use kdl::KdlDocument;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Environment variable overriding the base data directory.
pub const DATA_DIR_ENV: &str = "KB_DATA_DIR";

const CONFIG_FILE: &str = "board.kdl";
const STATE_FILE: &str = "board.json";
const EVENTS_FILE: &str = "events.jsonl";

/// One line of `events.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

/// Storage manager for a single repository.
pub struct Storage {
    /// Root directory for this repository's data
    pub root: PathBuf,
}

impl Storage {
    /// Open storage for the given repository path.
    pub fn open(repo_path: &Path) -> Result<Self> {
        Self::open_with_data_dir(repo_path, &base_data_dir()?)
    }

    /// Open storage under an explicit base data directory.
    pub fn open_with_data_dir(repo_path: &Path, data_dir: &Path) -> Result<Self> {
        let root = storage_dir_in(repo_path, data_dir)?;
        if !root.join(STATE_FILE).exists() {
            return Err(Error::NotInitialized);
        }
        Ok(Self { root })
    }

    /// Initialize storage for a new board.
    pub fn init(repo_path: &Path, config: &BoardConfig) -> Result<Self> {
        Self::init_with_data_dir(repo_path, &base_data_dir()?, config)
    }

    /// Initialize storage under an explicit base data directory.
    ///
    /// Writes `config` to board.kdl and an empty board built from the
    /// resolved configuration to board.json.
    pub fn init_with_data_dir(
        repo_path: &Path,
        data_dir: &Path,
        config: &BoardConfig,
    ) -> Result<Self> {
        let root = storage_dir_in(repo_path, data_dir)?;
        if Self::exists_with_data_dir(repo_path, data_dir)? {
            return Err(Error::AlreadyInitialized(root.display().to_string()));
        }

        let resolved = resolve_config(config, &ConfigOverrides::default())?;
        let initial = BoardState::from_config(&resolved)?;

        fs::create_dir_all(&root)?;
        let storage = Self { root };
        storage.save_config(config)?;
        storage.save_state(&initial)?;
        File::create(storage.root.join(EVENTS_FILE))?;

        tracing::info!(root = %storage.root.display(), "initialized board storage");
        Ok(storage)
    }

    /// Check if a board exists for the given repository.
    pub fn exists_with_data_dir(repo_path: &Path, data_dir: &Path) -> Result<bool> {
        Ok(storage_dir_in(repo_path, data_dir)?
            .join(STATE_FILE)
            .exists())
    }

    // === Configuration ===

    /// Load board.kdl. A missing file yields an empty config.
    pub fn load_config(&self) -> Result<BoardConfig> {
        let path = self.root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(BoardConfig::default());
        }
        let content = fs::read_to_string(&path)?;
        let doc: KdlDocument = content.parse()?;
        Ok(BoardConfig::from_kdl(&doc))
    }

    pub fn save_config(&self, config: &BoardConfig) -> Result<()> {
        write_atomic(&self.root.join(CONFIG_FILE), &config.to_kdl().to_string())
    }

    // === Board snapshot ===

    /// Load board.json.
    ///
    /// The snapshot's states and fallback must match the layout board.kdl
    /// resolves to; a board edited out from under its snapshot is refused.
    pub fn load_state(&self) -> Result<BoardState> {
        let content = fs::read_to_string(self.root.join(STATE_FILE))?;
        let state: BoardState = serde_json::from_str(&content)?;
        self.check_layout(&state)?;
        Ok(state)
    }

    fn check_layout(&self, state: &BoardState) -> Result<()> {
        let config = resolve_config(&self.load_config()?, &ConfigOverrides::default())?;
        if config.states() != state.states() {
            return Err(Error::Config(format!(
                "{} lists states [{}] but the board has [{}]; restore the board's states in {}",
                CONFIG_FILE,
                config.states().join(", "),
                state.states().join(", "),
                CONFIG_FILE
            )));
        }
        if config.state_for_unknown() != state.state_for_unknown() {
            return Err(Error::Config(format!(
                "{} sets state-for-unknown \"{}\" but the board uses \"{}\"; restore it in {}",
                CONFIG_FILE,
                config.state_for_unknown(),
                state.state_for_unknown(),
                CONFIG_FILE
            )));
        }
        Ok(())
    }

    /// Replace board.json. The write goes through a temporary file so a
    /// reader sees either the old snapshot or the new one.
    pub fn save_state(&self, state: &BoardState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(&self.root.join(STATE_FILE), &json)
    }

    // === Event history ===

    pub fn append_event(&self, event: &Event) -> Result<()> {
        let record = EventRecord {
            timestamp: Utc::now(),
            event: event.clone(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(EVENTS_FILE))?;
        let json = serde_json::to_string(&record)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Read the event history, oldest first. Unparseable lines are skipped.
    pub fn read_events(&self) -> Result<Vec<EventRecord>> {
        let path = self.root.join(EVENTS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&path)?);

        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EventRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "skipping malformed event record"),
            }
        }
        Ok(records)
    }

    /// Persist the snapshot produced by `event`, then record the event.
    ///
    /// The snapshot is authoritative. Once it is saved, a failed history
    /// append only loses the log line.
    pub fn commit(&self, event: &Event, state: &BoardState) -> Result<()> {
        self.save_state(state)?;
        if let Err(e) = self.append_event(event) {
            tracing::warn!(error = %e, event = event.name(), "failed to record event");
        }
        Ok(())
    }
}

/// `board.json` -> `board.json.tmp`, so files sharing a stem never share a
/// temporary.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Base data directory: `$KB_DATA_DIR`, or `<data_dir>/kanban`.
fn base_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("kanban"))
}

fn storage_dir_in(repo_path: &Path, data_dir: &Path) -> Result<PathBuf> {
    let repo_canonical = repo_path.canonicalize().map_err(|e| {
        Error::InvalidInput(format!(
            "Could not canonicalize repo path {}: {}",
            repo_path.display(),
            e
        ))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(repo_canonical.to_string_lossy().as_bytes());
    let hash_hex = format!("{:x}", hasher.finalize());

    Ok(data_dir.join(&hash_hex[..12]))
}

/// Find the git repository root by walking up from `start`.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.canonicalize().ok()?;
    loop {
        if current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
