//! Integration tests for issue CLI operations.
//!
//! These tests verify that issue commands work correctly through the CLI:
//! - `kb issue add/move/show/sync/rm` all work
//! - JSON and human-readable output formats are correct
//! - Moves only go to adjacent states

mod common;

use common::TestEnv;
use predicates::prelude::*;

// === Issue Add Tests ===

#[test]
fn test_issue_add_json() {
    let env = TestEnv::init();
    let json = env.json(&["issue", "add", "My first issue"]);

    assert_eq!(json["key"], "KAN-1");
    assert_eq!(json["summary"], "My first issue");
    assert_eq!(json["type"], "Story");
    assert_eq!(json["temporal"], true);
    assert_eq!(json["state"], "Backlog");
}

#[test]
fn test_issue_add_human() {
    let env = TestEnv::init();
    env.kb()
        .args(["-H", "issue", "add", "My first issue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created issue KAN-1"))
        .stdout(predicate::str::contains("\"My first issue\""));
}

#[test]
fn test_issue_add_with_options() {
    let env = TestEnv::init();
    let json = env.json(&[
        "issue", "add", "Crash on save", "-t", "Bug", "-a", "dana", "-k", "BUG-7",
    ]);
    assert_eq!(json["key"], "BUG-7");
    assert_eq!(json["type"], "Bug");
    assert_eq!(json["assignee"], "dana");

    env.kb()
        .args(["-H", "issue", "show", "BUG-7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BUG-7* [U] @dana"));
}

#[test]
fn test_issue_add_duplicate_key_fails() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "One", "-k", "X-1"]);
    env.kb()
        .args(["issue", "add", "Two", "-k", "X-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_issue_add_after_largest_key_fails() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Last", "-k", "KAN-18446744073709551615"]);

    env.kb()
        .args(["issue", "add", "Next"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--key"));
    env.json(&["issue", "add", "Next", "-k", "KAN-1"]);
}

#[test]
fn test_issue_keys_increment() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "One"]);
    env.json(&["issue", "add", "Two"]);
    let third = env.json(&["issue", "add", "Three"]);
    assert_eq!(third["key"], "KAN-3");
}

// === Issue Move Tests ===

#[test]
fn test_issue_move_right() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);

    let moved = env.json(&["issue", "move", "KAN-1", "--right"]);
    assert_eq!(moved["from_state"], "Backlog");
    assert_eq!(moved["to_state"], "In Progress");

    assert!(env.column_keys("Backlog").is_empty());
    assert_eq!(env.column_keys("In Progress"), vec!["KAN-1"]);
}

#[test]
fn test_issue_move_human() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);
    env.kb()
        .args(["-H", "issue", "move", "KAN-1", "--right"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved KAN-1 from Backlog to In Progress"));
}

#[test]
fn test_issue_move_left_from_first_state_fails() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);
    env.kb()
        .args(["issue", "move", "KAN-1", "--left"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot move left"));
}

#[test]
fn test_issue_move_right_from_last_state_fails() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);
    env.json(&["issue", "move", "KAN-1", "--right"]);
    env.json(&["issue", "move", "KAN-1", "--right"]);
    assert_eq!(env.column_keys("Done"), vec!["KAN-1"]);

    env.kb()
        .args(["issue", "move", "KAN-1", "--right"])
        .assert()
        .failure();
    assert_eq!(env.column_keys("Done"), vec!["KAN-1"]);
}

#[test]
fn test_issue_move_to_adjacent_state() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);

    let moved = env.json(&["issue", "move", "KAN-1", "--to", "In Progress"]);
    assert_eq!(moved["from_state"], "Backlog");
    assert_eq!(moved["to_state"], "In Progress");
    assert_eq!(env.column_keys("In Progress"), vec!["KAN-1"]);
}

#[test]
fn test_issue_move_to_non_adjacent_state_fails() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);

    env.kb()
        .args(["issue", "move", "KAN-1", "--to", "Done"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not adjacent"));
    env.kb()
        .args(["issue", "move", "KAN-1", "--to", "Review"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown state: Review"));
    assert_eq!(env.column_keys("Backlog"), vec!["KAN-1"]);
}

#[test]
fn test_issue_move_requires_one_target() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);

    env.kb().args(["issue", "move", "KAN-1"]).assert().failure();
    env.kb()
        .args(["issue", "move", "KAN-1", "--left", "--right"])
        .assert()
        .failure();
}

#[test]
fn test_issue_move_unknown_key_fails() {
    let env = TestEnv::init();
    env.kb()
        .args(["issue", "move", "KAN-99", "--right"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// === Issue Show Tests ===

#[test]
fn test_issue_show_adjacency() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);
    env.json(&["issue", "move", "KAN-1", "--right"]);

    let shown = env.json(&["issue", "show", "KAN-1"]);
    assert_eq!(shown["state"], "In Progress");
    assert_eq!(shown["adjacency"]["left"], "Backlog");
    assert_eq!(shown["adjacency"]["right"], "Done");
}

// === Issue Sync / Rm Tests ===

#[test]
fn test_issue_sync_clears_temporal_badge() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "Card"]);
    env.json(&["issue", "sync", "KAN-1"]);

    assert_eq!(env.json(&["issue", "show", "KAN-1"])["temporal"], false);
    env.kb()
        .args(["-H", "board"])
        .assert()
        .success()
        .stdout(predicate::str::contains("KAN-1 [S]"))
        .stdout(predicate::str::contains("KAN-1*").not());
}

#[test]
fn test_issue_rm() {
    let env = TestEnv::init();
    env.json(&["issue", "add", "One"]);
    env.json(&["issue", "add", "Two"]);
    env.json(&["issue", "move", "KAN-1", "--right"]);

    let removed = env.json(&["issue", "rm", "KAN-1"]);
    assert_eq!(removed["key"], "KAN-1");

    assert!(env.column_keys("In Progress").is_empty());
    assert_eq!(env.column_keys("Backlog"), vec!["KAN-2"]);

    env.kb()
        .args(["issue", "rm", "KAN-1"])
        .assert()
        .failure();
}
