//! Data models for the kanban board.
//!
//! This module defines the core data structures:
//! - `Issue` - An issue record (type, summary, assignee, temporal flag)
//! - `IssueMap` - Issues keyed by `IssueKey`, iterated in insertion order
//! - `ResolvedIssue` - An issue merged with its key, ready for display
//! - `IssueType` - The issue type tag ("Story" or anything else)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique, stable identifier of an issue (e.g., "KAN-12").
pub type IssueKey = String;

/// Name of a workflow state (e.g., "In Progress").
pub type StateName = String;

/// Issue type tag.
///
/// Only `Story` has a dedicated glyph; every other tag is kept verbatim
/// and displayed as unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    #[default]
    Story,
    Other(String),
}

impl IssueType {
    /// Parse from a type tag. Matching is exact, like the tag itself.
    pub fn parse(s: &str) -> Self {
        match s {
            "Story" => IssueType::Story,
            other => IssueType::Other(other.to_string()),
        }
    }

    /// Get the tag string.
    pub fn as_str(&self) -> &str {
        match self {
            IssueType::Story => "Story",
            IssueType::Other(tag) => tag,
        }
    }

    /// Single-character glyph shown on a card.
    pub fn glyph(&self) -> char {
        match self {
            IssueType::Story => 'S',
            IssueType::Other(_) => 'U',
        }
    }
}

impl From<String> for IssueType {
    fn from(s: String) -> Self {
        IssueType::parse(&s)
    }
}

impl From<IssueType> for String {
    fn from(t: IssueType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An issue record, stored without its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue type tag
    #[serde(rename = "type", default)]
    pub issue_type: IssueType,

    /// One-line summary
    pub summary: String,

    /// Assigned person, empty when unassigned
    #[serde(default)]
    pub assignee: String,

    /// True while the issue exists only locally and has not been synced
    #[serde(default)]
    pub temporal: bool,
}

impl Issue {
    /// Create a synced issue with the given type and summary.
    pub fn new(issue_type: IssueType, summary: impl Into<String>) -> Self {
        Self {
            issue_type,
            summary: summary.into(),
            assignee: String::new(),
            temporal: false,
        }
    }

    /// Builder-style assignee setter.
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }

    /// Builder-style temporal setter.
    pub fn with_temporal(mut self, temporal: bool) -> Self {
        self.temporal = temporal;
        self
    }
}

/// An issue record merged with its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIssue {
    pub key: IssueKey,

    #[serde(rename = "type")]
    pub issue_type: IssueType,

    pub summary: String,

    pub assignee: String,

    pub temporal: bool,
}

impl ResolvedIssue {
    /// Copy the named fields of `issue` and attach `key`.
    pub fn new(key: &str, issue: &Issue) -> Self {
        Self {
            key: key.to_string(),
            issue_type: issue.issue_type.clone(),
            summary: issue.summary.clone(),
            assignee: issue.assignee.clone(),
            temporal: issue.temporal,
        }
    }
}

/// Serialized form of one `IssueMap` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEntry {
    pub key: IssueKey,
    #[serde(flatten)]
    pub issue: Issue,
}

/// Issues keyed by `IssueKey`, iterated in insertion order.
///
/// Serialized as a JSON array of `{key, type, summary, assignee, temporal}`
/// so the order survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<IssueEntry>", into = "Vec<IssueEntry>")]
pub struct IssueMap {
    order: Vec<IssueKey>,
    by_key: HashMap<IssueKey, Issue>,
}

impl IssueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an issue. Replaces the record in place if the key exists,
    /// keeping its original position, and returns the previous record.
    pub fn insert(&mut self, key: impl Into<IssueKey>, issue: Issue) -> Option<Issue> {
        let key = key.into();
        let previous = self.by_key.insert(key.clone(), issue);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    pub fn get(&self, key: &str) -> Option<&Issue> {
        self.by_key.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Issue> {
        self.by_key.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Remove an issue, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<Issue> {
        let removed = self.by_key.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &IssueKey> {
        self.order.iter()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&IssueKey, &Issue)> {
        self.order.iter().map(move |k| (k, &self.by_key[k]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl From<Vec<IssueEntry>> for IssueMap {
    fn from(entries: Vec<IssueEntry>) -> Self {
        let mut map = IssueMap::new();
        for entry in entries {
            map.insert(entry.key, entry.issue);
        }
        map
    }
}

impl From<IssueMap> for Vec<IssueEntry> {
    fn from(mut map: IssueMap) -> Self {
        map.order
            .into_iter()
            .filter_map(|key| {
                let issue = map.by_key.remove(&key)?;
                Some(IssueEntry { key, issue })
            })
            .collect()
    }
}

impl<K: Into<IssueKey>> FromIterator<(K, Issue)> for IssueMap {
    fn from_iter<I: IntoIterator<Item = (K, Issue)>>(iter: I) -> Self {
        let mut map = IssueMap::new();
        for (key, issue) in iter {
            map.insert(key, issue);
        }
        map
    }
}

/// Next free key of the form `<prefix>-<n>`, one past the highest numeric
/// suffix currently used with that prefix.
///
/// Fails when that suffix is already `u64::MAX`.
pub fn next_issue_key(prefix: &str, issues: &IssueMap) -> Result<IssueKey> {
    let lead = format!("{}-", prefix);
    let highest = issues
        .keys()
        .filter_map(|k| k.strip_prefix(&lead))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    let next = highest.checked_add(1).ok_or_else(|| {
        Error::InvalidInput(format!(
            "no key left after {}{}; pass --key explicitly",
            lead, highest
        ))
    })?;
    Ok(format!("{}{}", lead, next))
}
