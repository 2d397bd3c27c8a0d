//! Board projection and transition adjacency.
//!
//! - [`project_issues_onto_columns`] turns the raw board assignment and the
//!   issue records into per-state columns of resolved issues, attaching every
//!   issue with no placement to the fallback state.
//! - [`adjacent_states`] and [`StateIndex`] find the neighbours of a state,
//!   which decide whether a card can move left or right and where it lands.
//!
//! Both are pure: they read their inputs and build new values.

use crate::models::{IssueKey, IssueMap, ResolvedIssue, StateName};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Board assignment: for each state, the issue keys placed there, in order.
pub type BoardIssues = BTreeMap<StateName, Vec<IssueKey>>;

/// One rendered column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub state: StateName,
    pub issues: Vec<ResolvedIssue>,
}

/// Projected board: one column per state, in state order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Columns(Vec<Column>);

impl Columns {
    /// Issues of the column for `state`, if the state is on the board.
    pub fn get(&self, state: &str) -> Option<&[ResolvedIssue]> {
        self.0
            .iter()
            .find(|c| c.state == state)
            .map(|c| c.issues.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of cards across all columns.
    pub fn card_count(&self) -> usize {
        self.0.iter().map(|c| c.issues.len()).sum()
    }
}

/// Keys of `all_issues` that are not in `issues_on_board`, in the
/// insertion order of `all_issues`.
pub fn unassigned_issue_keys<'a>(
    all_issues: &'a IssueMap,
    issues_on_board: &HashSet<IssueKey>,
) -> Vec<&'a IssueKey> {
    all_issues
        .keys()
        .filter(|k| !issues_on_board.contains(*k))
        .collect()
}

/// Project the board assignment onto columns.
///
/// Every state in `states` gets a column, in order. The fallback column lists
/// its explicit placements first and then every unassigned issue; the other
/// columns list `board_issues[state]` unchanged. Keys placed twice are kept
/// twice.
///
/// # Errors
///
/// - [`Error::Config`] if `fallback_state` is not one of `states`, or if any
///   state has no entry in `board_issues`.
/// - [`Error::UnknownIssue`] if a placed key has no record in `all_issues`.
pub fn project_issues_onto_columns(
    states: &[StateName],
    board_issues: &BoardIssues,
    all_issues: &IssueMap,
    issues_on_board: &HashSet<IssueKey>,
    fallback_state: &str,
) -> Result<Columns> {
    if !states.iter().any(|s| s == fallback_state) {
        return Err(Error::Config(format!(
            "fallback state \"{}\" is not one of the board states",
            fallback_state
        )));
    }
    if !board_issues.contains_key(fallback_state) {
        return Err(Error::Config(format!(
            "fallback state \"{}\" has no entry in the board assignment",
            fallback_state
        )));
    }

    let unassigned = unassigned_issue_keys(all_issues, issues_on_board);

    let mut columns = Vec::with_capacity(states.len());
    for state in states {
        let placed = board_issues.get(state).ok_or_else(|| {
            Error::Config(format!(
                "state \"{}\" has no entry in the board assignment",
                state
            ))
        })?;

        let extra: &[&IssueKey] = if state == fallback_state {
            &unassigned
        } else {
            &[]
        };

        let issues = placed
            .iter()
            .chain(extra.iter().copied())
            .map(|key| {
                all_issues
                    .get(key)
                    .map(|issue| ResolvedIssue::new(key, issue))
                    .ok_or_else(|| Error::UnknownIssue {
                        key: key.clone(),
                        state: state.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        columns.push(Column {
            state: state.clone(),
            issues,
        });
    }

    Ok(Columns(columns))
}

/// Direction of a card transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// Neighbours of a state in the state ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacency {
    pub left: Option<StateName>,
    pub right: Option<StateName>,
}

impl Adjacency {
    /// Target state of a move in `direction`, or `None` if that control is
    /// disabled.
    pub fn target(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Left => self.left.as_deref(),
            Direction::Right => self.right.as_deref(),
        }
    }

    pub fn can_move_left(&self) -> bool {
        self.left.is_some()
    }

    pub fn can_move_right(&self) -> bool {
        self.right.is_some()
    }
}

fn adjacency_at(states: &[StateName], idx: usize) -> Adjacency {
    Adjacency {
        left: idx.checked_sub(1).map(|i| states[i].clone()),
        right: states.get(idx + 1).cloned(),
    }
}

/// Neighbours of `state` by scanning `states`.
///
/// Uses the first occurrence if a name repeats.
pub fn adjacent_states(states: &[StateName], state: &str) -> Result<Adjacency> {
    let idx = states
        .iter()
        .position(|s| s == state)
        .ok_or_else(|| Error::UnknownState(state.to_string()))?;
    Ok(adjacency_at(states, idx))
}

/// Precomputed state positions for O(1) adjacency lookups.
#[derive(Debug, Clone)]
pub struct StateIndex {
    states: Vec<StateName>,
    positions: HashMap<StateName, usize>,
}

impl StateIndex {
    pub fn new(states: &[StateName]) -> Self {
        let mut positions = HashMap::with_capacity(states.len());
        for (i, s) in states.iter().enumerate() {
            positions.entry(s.clone()).or_insert(i);
        }
        Self {
            states: states.to_vec(),
            positions,
        }
    }

    pub fn position(&self, state: &str) -> Option<usize> {
        self.positions.get(state).copied()
    }

    pub fn contains(&self, state: &str) -> bool {
        self.positions.contains_key(state)
    }

    pub fn adjacent(&self, state: &str) -> Result<Adjacency> {
        let idx = self
            .position(state)
            .ok_or_else(|| Error::UnknownState(state.to_string()))?;
        Ok(adjacency_at(&self.states, idx))
    }

    /// True if `a` and `b` are immediate neighbours.
    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(i), Some(j)) => i.abs_diff(j) == 1,
            _ => false,
        }
    }
}
