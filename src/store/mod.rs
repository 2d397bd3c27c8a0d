//! Board store: immutable snapshots and the events that produce new ones.
//!
//! A [`BoardState`] is one consistent snapshot of the board. Selectors read
//! it; [`BoardState::apply`] validates an [`Event`] and returns a new snapshot,
//! leaving the original untouched. [`Store`] holds the current snapshot and
//! swaps it on every successful dispatch, so readers never observe a
//! half-applied move.

use crate::board::{self, BoardIssues, Columns, StateIndex};
use crate::config::ResolvedConfig;
use crate::models::{Issue, IssueKey, IssueMap, StateName};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A board mutation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Relocate one issue to an adjacent state.
    MoveIssue {
        issue_key: IssueKey,
        from_state: StateName,
        to_state: StateName,
    },
    /// Create an issue. It has no placement, so it shows in the fallback column.
    AddIssue { key: IssueKey, issue: Issue },
    /// Mark a temporal issue as synced.
    SyncIssue { issue_key: IssueKey },
    /// Delete an issue and every placement of it.
    RemoveIssue { issue_key: IssueKey },
    OpenIssueEditor,
    CloseIssueEditor,
}

impl Event {
    /// Short name used in logs and the event history.
    pub fn name(&self) -> &'static str {
        match self {
            Event::MoveIssue { .. } => "move_issue",
            Event::AddIssue { .. } => "add_issue",
            Event::SyncIssue { .. } => "sync_issue",
            Event::RemoveIssue { .. } => "remove_issue",
            Event::OpenIssueEditor => "open_issue_editor",
            Event::CloseIssueEditor => "close_issue_editor",
        }
    }
}

/// One snapshot of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    states: Vec<StateName>,
    state_for_unknown: StateName,
    board_issues: BoardIssues,
    #[serde(default)]
    issues: IssueMap,
    #[serde(default)]
    editor_opened: bool,
}

impl BoardState {
    /// Empty board with one column per state.
    ///
    /// Fails with [`Error::Config`] if `state_for_unknown` is not one of
    /// `states`.
    pub fn new(states: Vec<StateName>, state_for_unknown: impl Into<StateName>) -> Result<Self> {
        let state_for_unknown = state_for_unknown.into();
        if !states.contains(&state_for_unknown) {
            return Err(Error::Config(format!(
                "fallback state \"{}\" is not one of the board states",
                state_for_unknown
            )));
        }
        let board_issues = states.iter().map(|s| (s.clone(), Vec::new())).collect();
        Ok(Self {
            states,
            state_for_unknown,
            board_issues,
            issues: IssueMap::new(),
            editor_opened: false,
        })
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        Self::new(config.states().to_vec(), config.state_for_unknown())
    }

    // ---- selectors ----

    pub fn states(&self) -> &[StateName] {
        &self.states
    }

    pub fn board_issues(&self) -> &BoardIssues {
        &self.board_issues
    }

    pub fn issues(&self) -> &IssueMap {
        &self.issues
    }

    /// Keys explicitly placed in some state.
    pub fn issues_on_board(&self) -> HashSet<IssueKey> {
        self.board_issues.values().flatten().cloned().collect()
    }

    pub fn state_for_unknown(&self) -> &str {
        &self.state_for_unknown
    }

    pub fn editor_opened(&self) -> bool {
        self.editor_opened
    }

    /// State whose column shows `key`: its explicit placement, or the fallback
    /// state for an issue with none. `None` if the issue does not exist.
    pub fn state_of(&self, key: &str) -> Option<&str> {
        if !self.issues.contains_key(key) {
            return None;
        }
        let placed = self
            .states
            .iter()
            .find(|s| {
                self.board_issues
                    .get(*s)
                    .is_some_and(|keys| keys.iter().any(|k| k == key))
            });
        Some(placed.unwrap_or(&self.state_for_unknown).as_str())
    }

    /// Project this snapshot onto columns.
    pub fn render(&self) -> Result<Columns> {
        board::project_issues_onto_columns(
            &self.states,
            &self.board_issues,
            &self.issues,
            &self.issues_on_board(),
            &self.state_for_unknown,
        )
    }

    // ---- updates ----

    /// Apply `event`, returning the next snapshot. `self` is never modified;
    /// on error no snapshot is produced.
    pub fn apply(&self, event: &Event) -> Result<BoardState> {
        let mut next = self.clone();
        match event {
            Event::MoveIssue {
                issue_key,
                from_state,
                to_state,
            } => next.move_issue(issue_key, from_state, to_state)?,
            Event::AddIssue { key, issue } => {
                if key.trim().is_empty() {
                    return Err(Error::InvalidInput("issue key must not be empty".to_string()));
                }
                if next.issues.contains_key(key) {
                    return Err(Error::DuplicateIssue(key.clone()));
                }
                next.issues.insert(key.clone(), issue.clone());
                next.editor_opened = false;
            }
            Event::SyncIssue { issue_key } => {
                let issue = next
                    .issues
                    .get_mut(issue_key)
                    .ok_or_else(|| Error::NotFound(issue_key.clone()))?;
                issue.temporal = false;
            }
            Event::RemoveIssue { issue_key } => {
                next.issues
                    .remove(issue_key)
                    .ok_or_else(|| Error::NotFound(issue_key.clone()))?;
                for keys in next.board_issues.values_mut() {
                    keys.retain(|k| k != issue_key);
                }
            }
            Event::OpenIssueEditor => next.editor_opened = true,
            Event::CloseIssueEditor => next.editor_opened = false,
        }
        Ok(next)
    }

    fn move_issue(&mut self, key: &str, from: &str, to: &str) -> Result<()> {
        let index = StateIndex::new(&self.states);
        for state in [from, to] {
            if !index.contains(state) {
                return Err(Error::UnknownState(state.to_string()));
            }
        }
        if !index.are_adjacent(from, to) {
            return Err(Error::NotAdjacent {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        match self.state_of(key) {
            None => return Err(Error::NotFound(key.to_string())),
            Some(current) if current != from => {
                return Err(Error::InvalidInput(format!(
                    "issue {} is in state \"{}\", not \"{}\"",
                    key, current, from
                )));
            }
            Some(_) => {}
        }

        // An issue shown in the fallback column through the unassigned rule
        // has no entry to remove.
        if let Some(source) = self.board_issues.get_mut(from) {
            if let Some(pos) = source.iter().position(|k| k == key) {
                source.remove(pos);
            }
        }
        self.board_issues
            .get_mut(to)
            .ok_or_else(|| {
                Error::Config(format!("state \"{}\" has no entry in the board assignment", to))
            })?
            .push(key.to_string());
        Ok(())
    }
}

/// Holder of the current board snapshot.
#[derive(Debug, Clone)]
pub struct Store {
    current: BoardState,
}

impl Store {
    pub fn new(initial: BoardState) -> Self {
        Self { current: initial }
    }

    pub fn snapshot(&self) -> &BoardState {
        &self.current
    }

    /// Apply `event` and make the result the current snapshot.
    pub fn dispatch(&mut self, event: &Event) -> Result<&BoardState> {
        let next = self.current.apply(event).inspect_err(|e| {
            tracing::debug!(event = event.name(), error = %e, "event rejected");
        })?;
        tracing::debug!(event = event.name(), "event applied");
        self.current = next;
        Ok(&self.current)
    }

    pub fn into_snapshot(self) -> BoardState {
        self.current
    }
}
