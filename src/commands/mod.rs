//! Command implementations for the `kb` CLI.
//!
//! Each command takes an opened [`Storage`], does its work through the board
//! store, and returns a result that prints as JSON or as human-readable text.

use crate::board::{Adjacency, Columns, Direction, StateIndex};
use crate::config::{BoardConfig, ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config};
use crate::models::{Issue, IssueType, ResolvedIssue, StateName, next_issue_key};
use crate::render;
use crate::storage::{EventRecord, Storage};
use crate::store::{BoardState, Event, Store};
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
}

/// Load the snapshot, apply `event`, and persist the result.
fn dispatch(storage: &Storage, event: Event) -> Result<BoardState> {
    let mut store = Store::new(storage.load_state()?);
    store.dispatch(&event)?;
    let next = store.into_snapshot();
    storage.commit(&event, &next)?;
    tracing::info!(event = event.name(), "board updated");
    Ok(next)
}

/// Resolve the effective configuration for an opened board.
pub fn resolved_config(storage: &Storage, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    resolve_config(&storage.load_config()?, overrides)
}

// === init ===

#[derive(Serialize)]
pub struct InitResult {
    pub root: String,
    pub states: Vec<StateName>,
    pub state_for_unknown: StateName,
    pub key_prefix: String,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Initialized board at {}\nStates: {}\nUnplaced issues go to: {}\nKey prefix: {}",
            self.root,
            self.states.join(" -> "),
            self.state_for_unknown,
            self.key_prefix
        )
    }
}

/// Create the board for `repo_path` under `data_dir` (or the default data
/// directory when `None`).
pub fn init(
    repo_path: &Path,
    data_dir: Option<&Path>,
    states: Vec<String>,
    fallback: Option<String>,
    prefix: Option<String>,
    output_format: Option<String>,
) -> Result<InitResult> {
    let output_format = match output_format {
        Some(s) => Some(OutputFormat::parse(&s).ok_or_else(|| {
            Error::InvalidInput(format!("output format must be json or human, got \"{}\"", s))
        })?),
        None => None,
    };
    let config = BoardConfig {
        states: if states.is_empty() { None } else { Some(states) },
        state_for_unknown: fallback,
        key_prefix: prefix,
        output_format,
    };

    let storage = match data_dir {
        Some(dir) => Storage::init_with_data_dir(repo_path, dir, &config)?,
        None => Storage::init(repo_path, &config)?,
    };
    let state = storage.load_state()?;
    let resolved = resolved_config(&storage, &ConfigOverrides::default())?;

    Ok(InitResult {
        root: storage.root.display().to_string(),
        states: state.states().to_vec(),
        state_for_unknown: state.state_for_unknown().to_string(),
        key_prefix: resolved.key_prefix().to_string(),
    })
}

// === board ===

#[derive(Serialize)]
pub struct BoardView {
    pub columns: Columns,
    pub state_for_unknown: StateName,
    pub editor_opened: bool,
    #[serde(skip)]
    human: String,
}

impl Output for BoardView {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        self.human.clone()
    }
}

pub fn board_show(storage: &Storage) -> Result<BoardView> {
    let state = storage.load_state()?;
    let columns = state.render()?;
    let index = StateIndex::new(state.states());
    let human = render::render_board(&columns, &index, state.editor_opened())?;

    Ok(BoardView {
        columns,
        state_for_unknown: state.state_for_unknown().to_string(),
        editor_opened: state.editor_opened(),
        human,
    })
}

// === states ===

#[derive(Serialize)]
pub struct StateInfo {
    pub name: StateName,
    pub position: usize,
    pub left: Option<StateName>,
    pub right: Option<StateName>,
    pub fallback: bool,
    pub issue_count: usize,
}

#[derive(Serialize)]
pub struct StatesResult {
    pub states: Vec<StateInfo>,
}

impl Output for StatesResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        self.states
            .iter()
            .map(|s| {
                let marker = if s.fallback { " (fallback)" } else { "" };
                format!(
                    "{}. {}{} - {} issue(s), left: {}, right: {}",
                    s.position + 1,
                    s.name,
                    marker,
                    s.issue_count,
                    s.left.as_deref().unwrap_or("-"),
                    s.right.as_deref().unwrap_or("-"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn states_list(storage: &Storage) -> Result<StatesResult> {
    let state = storage.load_state()?;
    let columns = state.render()?;
    let index = StateIndex::new(state.states());

    let states = state
        .states()
        .iter()
        .enumerate()
        .map(|(position, name)| -> Result<StateInfo> {
            let adjacency = index.adjacent(name)?;
            Ok(StateInfo {
                name: name.clone(),
                position,
                left: adjacency.left,
                right: adjacency.right,
                fallback: name == state.state_for_unknown(),
                issue_count: columns.get(name).map_or(0, <[_]>::len),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StatesResult { states })
}

// === issue ===

#[derive(Serialize)]
pub struct IssueAdded {
    #[serde(flatten)]
    pub issue: ResolvedIssue,
    pub state: StateName,
}

impl Output for IssueAdded {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Created issue {} \"{}\" in {}",
            self.issue.key, self.issue.summary, self.state
        )
    }
}

pub fn issue_add(
    storage: &Storage,
    summary: String,
    issue_type: String,
    assignee: String,
    key: Option<String>,
) -> Result<IssueAdded> {
    if summary.trim().is_empty() {
        return Err(Error::InvalidInput("summary must not be empty".to_string()));
    }
    let resolved = resolved_config(storage, &ConfigOverrides::default())?;
    let current = storage.load_state()?;
    let key = match key {
        Some(key) => key,
        None => next_issue_key(resolved.key_prefix(), current.issues())?,
    };

    // New issues exist only locally until synced
    let issue = Issue::new(IssueType::parse(&issue_type), summary)
        .with_assignee(assignee)
        .with_temporal(true);

    let next = dispatch(
        storage,
        Event::AddIssue {
            key: key.clone(),
            issue: issue.clone(),
        },
    )?;

    Ok(IssueAdded {
        issue: ResolvedIssue::new(&key, &issue),
        state: next.state_of(&key).unwrap_or(next.state_for_unknown()).to_string(),
    })
}

#[derive(Serialize)]
pub struct IssueMoved {
    pub key: String,
    pub from_state: StateName,
    pub to_state: StateName,
}

impl Output for IssueMoved {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Moved {} from {} to {}",
            self.key, self.from_state, self.to_state
        )
    }
}

/// Where `kb issue move` sends an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    /// One state over in the given direction.
    Step(Direction),
    /// A named state, which must neighbour the current one.
    State(StateName),
}

pub fn issue_move(storage: &Storage, key: &str, target: MoveTarget) -> Result<IssueMoved> {
    let state = storage.load_state()?;
    let from_state = state
        .state_of(key)
        .ok_or_else(|| Error::NotFound(key.to_string()))?
        .to_string();
    let index = StateIndex::new(state.states());

    let to_state = match target {
        MoveTarget::Step(direction) => index
            .adjacent(&from_state)?
            .target(direction)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "{} is in \"{}\" and cannot move {}",
                    key,
                    from_state,
                    match direction {
                        Direction::Left => "left",
                        Direction::Right => "right",
                    }
                ))
            })?
            .to_string(),
        MoveTarget::State(to) => {
            if !index.contains(&to) {
                return Err(Error::UnknownState(to));
            }
            if !index.are_adjacent(&from_state, &to) {
                return Err(Error::NotAdjacent {
                    from: from_state,
                    to,
                });
            }
            to
        }
    };

    dispatch(
        storage,
        Event::MoveIssue {
            issue_key: key.to_string(),
            from_state: from_state.clone(),
            to_state: to_state.clone(),
        },
    )?;

    Ok(IssueMoved {
        key: key.to_string(),
        from_state,
        to_state,
    })
}

#[derive(Serialize)]
pub struct IssueShown {
    #[serde(flatten)]
    pub issue: ResolvedIssue,
    pub state: StateName,
    pub adjacency: Adjacency,
}

impl Output for IssueShown {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "{}\nState: {}\nType: {}",
            render::render_card(&self.issue, &self.adjacency),
            self.state,
            self.issue.issue_type
        )
    }
}

pub fn issue_show(storage: &Storage, key: &str) -> Result<IssueShown> {
    let state = storage.load_state()?;
    let issue = state
        .issues()
        .get(key)
        .ok_or_else(|| Error::NotFound(key.to_string()))?;
    let current = state.state_of(key).unwrap_or(state.state_for_unknown());
    let adjacency = StateIndex::new(state.states()).adjacent(current)?;

    Ok(IssueShown {
        issue: ResolvedIssue::new(key, issue),
        state: current.to_string(),
        adjacency,
    })
}

/// Result of a single-issue update (sync, remove).
#[derive(Serialize)]
pub struct IssueUpdated {
    pub key: String,
    pub action: &'static str,
}

impl Output for IssueUpdated {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!("{} {}", self.action_past_tense(), self.key)
    }
}

impl IssueUpdated {
    fn action_past_tense(&self) -> &'static str {
        match self.action {
            "sync" => "Synced",
            "remove" => "Removed",
            _ => "Updated",
        }
    }
}

pub fn issue_sync(storage: &Storage, key: &str) -> Result<IssueUpdated> {
    dispatch(
        storage,
        Event::SyncIssue {
            issue_key: key.to_string(),
        },
    )?;
    Ok(IssueUpdated {
        key: key.to_string(),
        action: "sync",
    })
}

pub fn issue_remove(storage: &Storage, key: &str) -> Result<IssueUpdated> {
    dispatch(
        storage,
        Event::RemoveIssue {
            issue_key: key.to_string(),
        },
    )?;
    Ok(IssueUpdated {
        key: key.to_string(),
        action: "remove",
    })
}

// === editor ===

#[derive(Serialize)]
pub struct EditorResult {
    pub editor_opened: bool,
}

impl Output for EditorResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.editor_opened {
            "Issue editor opened".to_string()
        } else {
            "Issue editor closed".to_string()
        }
    }
}

pub fn editor_set(storage: &Storage, open: bool) -> Result<EditorResult> {
    let event = if open {
        Event::OpenIssueEditor
    } else {
        Event::CloseIssueEditor
    };
    let next = dispatch(storage, event)?;
    Ok(EditorResult {
        editor_opened: next.editor_opened(),
    })
}

// === log ===

#[derive(Serialize)]
pub struct LogResult {
    pub events: Vec<EventRecord>,
}

impl Output for LogResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.events.is_empty() {
            return "No events recorded".to_string();
        }
        self.events
            .iter()
            .map(|r| {
                let detail = match &r.event {
                    Event::MoveIssue {
                        issue_key,
                        from_state,
                        to_state,
                    } => format!("{} {} -> {}", issue_key, from_state, to_state),
                    Event::AddIssue { key, issue } => format!("{} \"{}\"", key, issue.summary),
                    Event::SyncIssue { issue_key } | Event::RemoveIssue { issue_key } => {
                        issue_key.clone()
                    }
                    Event::OpenIssueEditor | Event::CloseIssueEditor => String::new(),
                };
                format!(
                    "{} {} {}",
                    r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    r.event.name(),
                    detail
                )
                .trim_end()
                .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn log_show(storage: &Storage, limit: Option<usize>) -> Result<LogResult> {
    let mut events = storage.read_events()?;
    if let Some(limit) = limit {
        let skip = events.len().saturating_sub(limit);
        events.drain(..skip);
    }
    Ok(LogResult { events })
}

// === config ===

#[derive(Serialize)]
pub struct ConfigValue<T: Serialize> {
    pub value: T,
    pub source: String,
}

#[derive(Serialize)]
pub struct ConfigResult {
    pub states: ConfigValue<Vec<String>>,
    pub state_for_unknown: ConfigValue<String>,
    pub key_prefix: ConfigValue<String>,
    pub output_format: ConfigValue<String>,
}

impl Output for ConfigResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "states: {} ({})\nstate-for-unknown: {} ({})\nkey-prefix: {} ({})\noutput-format: {} ({})",
            self.states.value.join(", "),
            self.states.source,
            self.state_for_unknown.value,
            self.state_for_unknown.source,
            self.key_prefix.value,
            self.key_prefix.source,
            self.output_format.value,
            self.output_format.source,
        )
    }
}

pub fn config_show(storage: &Storage, overrides: &ConfigOverrides) -> Result<ConfigResult> {
    // Refuses a board.kdl whose layout no longer matches the board
    storage.load_state()?;
    let r = resolved_config(storage, overrides)?;
    Ok(ConfigResult {
        states: ConfigValue {
            value: r.states.value.clone(),
            source: r.states.source.to_string(),
        },
        state_for_unknown: ConfigValue {
            value: r.state_for_unknown.value.clone(),
            source: r.state_for_unknown.source.to_string(),
        },
        key_prefix: ConfigValue {
            value: r.key_prefix.value.clone(),
            source: r.key_prefix.source.to_string(),
        },
        output_format: ConfigValue {
            value: r.output_format.value.to_string(),
            source: r.output_format.source.to_string(),
        },
    })
}
