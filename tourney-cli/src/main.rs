//! Tourney CLI - Command-line interface
//!
//! Commands:
//! - init: Start a tournament with N agents
//! - select: Pick the next agent to evaluate
//! - update: Record a score for an agent
//! - status: Print per-agent statistics and convergence
//! - winner: Print the current leader
//! - reset: Discard the tournament
//!
//! Data goes to stdout as JSON, failures to stderr as one line. The exit
//! code identifies the failure class.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tourney_core::error::EXIT_USAGE;
use tourney_core::{DEFAULT_STATE_FILE, STATE_PATH_ENV};

#[derive(Parser)]
#[command(name = "tourney", version)]
#[command(about = "Thompson-sampling tournament engine")]
struct Cli {
    /// Tournament state file
    #[arg(long, global = true, value_name = "FILE", env = STATE_PATH_ENV, default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,

    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new tournament, replacing any existing one
    Init {
        /// Number of competing agents
        #[arg(long)]
        agents: usize,
        /// RNG seed (drawn from OS entropy when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Pick the next agent to evaluate
    Select,
    /// Record a score in [0, 1] for an agent
    Update {
        /// Agent id, e.g. agent_0
        agent_id: String,
        /// Score in [0, 1]
        #[arg(allow_hyphen_values = true)]
        score: String,
    },
    /// Show per-agent statistics and convergence
    Status,
    /// Show the current leader and whether it is settled
    Winner,
    /// Discard the current tournament
    Reset,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        eprintln!("error: no command given (expected one of init, select, update, status, winner, reset)");
        return ExitCode::from(EXIT_USAGE);
    };

    let output = commands::Output { pretty: cli.pretty };
    match commands::run(command, &cli.state, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(commands::exit_code(&err))
        }
    }
}

/// Route tracing output to stderr so stdout stays machine-readable
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
