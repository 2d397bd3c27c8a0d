//! kb - a kanban board for issues.

use clap::Parser;
use kanban::board::Direction;
use kanban::cli::{Cli, Commands, EditorCommands, IssueCommands};
use kanban::commands::{self, MoveTarget, Output};
use kanban::config::ConfigOverrides;
use kanban::storage::{Storage, find_git_root};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling log verbosity (e.g. `KB_LOG=debug`).
const LOG_ENV: &str = "KB_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let human_flag = cli.human_readable;

    // Determine repo path: --repo flag > KB_REPO env > auto-detect git root > cwd
    let repo_path = resolve_repo_path(cli.repo_path, human_flag);
    let human = output_is_human(&repo_path, human_flag);

    if let Err(e) = run_command(cli.command, &repo_path, human_flag, human) {
        tracing::debug!(error = %e, "command failed");
        print_error(&e.to_string(), human);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// `-H`, or the board's configured `output-format` when a readable board
/// exists. Results and errors both use it.
fn output_is_human(repo_path: &Path, human_flag: bool) -> bool {
    if human_flag {
        return true;
    }
    Storage::open(repo_path)
        .and_then(|storage| commands::resolved_config(&storage, &ConfigOverrides::default()))
        .map(|config| config.is_human())
        .unwrap_or(false)
}

fn print_error(message: &str, human: bool) {
    if human {
        eprintln!("Error: {}", message);
    } else {
        eprintln!("{}", serde_json::json!({ "error": message }));
    }
}

/// Resolve the repository path based on explicit flag, environment variable, or auto-detection.
///
/// An explicit path is used literally; otherwise the git root of the current
/// directory, falling back to the current directory itself.
fn resolve_repo_path(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                print_error(
                    &format!("Specified repo path does not exist: {}", path.display()),
                    human,
                );
                process::exit(1);
            }
            path
        }
        None => {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            find_git_root(&cwd).unwrap_or(cwd)
        }
    }
}

fn run_command(
    command: Option<Commands>,
    repo_path: &Path,
    human_flag: bool,
    human: bool,
) -> Result<(), kanban::Error> {
    // `init` runs before any board exists
    let command = match command {
        Some(Commands::Init {
            states,
            fallback,
            prefix,
            output_format,
        }) => {
            let result = commands::init(repo_path, None, states, fallback, prefix, output_format)?;
            output(&result, human);
            return Ok(());
        }
        Some(other) => other,
        None => Commands::Board,
    };

    let storage = Storage::open(repo_path)?;
    let overrides = ConfigOverrides { human: human_flag };
    tracing::debug!(root = %storage.root.display(), human, "opened board");

    match command {
        Commands::Init { .. } | Commands::Board => {
            output(&commands::board_show(&storage)?, human)
        }
        Commands::States => output(&commands::states_list(&storage)?, human),
        Commands::Issue { command } => match command {
            IssueCommands::Add {
                summary,
                issue_type,
                assignee,
                key,
            } => output(
                &commands::issue_add(&storage, summary, issue_type, assignee, key)?,
                human,
            ),
            IssueCommands::Move {
                key,
                left,
                right: _,
                to,
            } => {
                // clap guarantees exactly one of --left, --right, --to
                let target = match to {
                    Some(state) => MoveTarget::State(state),
                    None if left => MoveTarget::Step(Direction::Left),
                    None => MoveTarget::Step(Direction::Right),
                };
                output(&commands::issue_move(&storage, &key, target)?, human)
            }
            IssueCommands::Show { key } => output(&commands::issue_show(&storage, &key)?, human),
            IssueCommands::Sync { key } => output(&commands::issue_sync(&storage, &key)?, human),
            IssueCommands::Rm { key } => output(&commands::issue_remove(&storage, &key)?, human),
        },
        Commands::Editor { command } => {
            let open = matches!(command, EditorCommands::Open);
            output(&commands::editor_set(&storage, open)?, human)
        }
        Commands::Log { limit } => output(&commands::log_show(&storage, limit)?, human),
        Commands::Config => output(&commands::config_show(&storage, &overrides)?, human),
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
