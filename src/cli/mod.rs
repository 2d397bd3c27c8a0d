//! CLI argument definitions for the kanban board.

use clap::{ArgGroup, Parser, Subcommand};

/// Kanban - an issue board with workflow columns.
///
/// Start with `kb init`, add issues with `kb issue add`, and look at the
/// board with `kb board`.
#[derive(Parser, Debug)]
#[command(name = "kb")]
#[command(
    author,
    version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("KB_GIT_COMMIT"),
        ", built ",
        env!("KB_BUILD_TIMESTAMP"),
        ")"
    ),
    about = "A kanban board for issues",
    long_about = None
)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if kb was started in <path> instead of the current directory.
    /// Can also be set via KB_REPO environment variable.
    #[arg(short = 'C', long = "repo", global = true, env = "KB_REPO")]
    pub repo_path: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a board for this repository
    Init {
        /// Workflow state, left to right (repeat for each column)
        #[arg(short = 's', long = "state")]
        states: Vec<String>,

        /// State that receives issues with no placement
        #[arg(short = 'f', long = "fallback")]
        fallback: Option<String>,

        /// Prefix for generated issue keys
        #[arg(short = 'p', long = "prefix")]
        prefix: Option<String>,

        /// Default output format: json or human
        #[arg(long = "output-format")]
        output_format: Option<String>,
    },

    /// Show the board: one column per state
    Board,

    /// List states with their neighbours
    States,

    /// Issue commands
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },

    /// Open or close the issue editor
    Editor {
        #[command(subcommand)]
        command: EditorCommands,
    },

    /// Show the history of board events
    Log {
        /// Show only the last N events
        #[arg(short = 'n', long = "limit")]
        limit: Option<usize>,
    },

    /// Show the effective configuration and where each value came from
    Config,
}

/// Issue subcommands
#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// Create an issue (shown in the fallback column until moved)
    Add {
        /// One-line summary
        summary: String,

        /// Issue type tag
        #[arg(short = 't', long = "type", default_value = "Story")]
        issue_type: String,

        /// Assignee
        #[arg(short = 'a', long = "assignee", default_value = "")]
        assignee: String,

        /// Explicit key instead of the next generated one
        #[arg(short = 'k', long = "key")]
        key: Option<String>,
    },

    /// Move an issue to the adjacent state on its left or right
    #[command(group(ArgGroup::new("target").required(true).args(["left", "right", "to"])))]
    Move {
        /// Issue key (e.g., KAN-3)
        key: String,

        /// Move to the state on the left
        #[arg(long)]
        left: bool,

        /// Move to the state on the right
        #[arg(long)]
        right: bool,

        /// Move to the named state, which must be adjacent to the current one
        #[arg(long, value_name = "STATE")]
        to: Option<String>,
    },

    /// Show one issue with its state and available moves
    Show {
        /// Issue key
        key: String,
    },

    /// Mark a temporal issue as synced
    Sync {
        /// Issue key
        key: String,
    },

    /// Delete an issue
    Rm {
        /// Issue key
        key: String,
    },
}

/// Editor subcommands
#[derive(Subcommand, Debug)]
pub enum EditorCommands {
    /// Open the issue editor
    Open,
    /// Close the issue editor
    Close,
}
