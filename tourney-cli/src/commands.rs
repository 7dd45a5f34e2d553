//! Command execution - one engine operation per invocation
//!
//! ## Architecture
//! - Level 1: run() - build the engine, dispatch, print
//! - Level 4: JSON output and exit code mapping

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use tourney_core::error::EXIT_IO;
use tourney_core::{parse_score, Engine, EngineConfig, StateStore, TournamentError};

use crate::Commands;

/// Output formatting options
pub struct Output {
    pub pretty: bool,
}

impl Output {
    /// Print one JSON document on stdout
    pub fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .context("Failed to encode output")?;
        println!("{}", json);
        Ok(())
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run one command against the state file at `state_path`
pub fn run(command: Commands, state_path: &Path, output: &Output) -> Result<()> {
    let engine = Engine::new(StateStore::new(state_path), EngineConfig::default())?;
    tracing::debug!("Using state file {}", state_path.display());

    match command {
        Commands::Init { agents, seed } => output.emit(&engine.init(agents, seed)?),
        Commands::Select => output.emit(&engine.select()?),
        Commands::Update { agent_id, score } => {
            let score = parse_score(&score)?;
            output.emit(&engine.update(&agent_id, score)?)
        }
        Commands::Status => output.emit(&engine.status()?),
        Commands::Winner => output.emit(&engine.winner()?),
        Commands::Reset => output.emit(&engine.reset()),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Exit code for a failed command; non-engine failures count as I/O
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<TournamentError>()
        .map(TournamentError::exit_code)
        .unwrap_or(EXIT_IO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for_engine_errors() {
        let err = anyhow::Error::from(TournamentError::NotInitialized);
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::from(TournamentError::UnknownAgent {
            id: "agent_7".to_string(),
            agent_count: 2,
        });
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::anyhow!("stdout closed");
        assert_eq!(exit_code(&err), EXIT_IO);
    }

    #[test]
    fn test_run_writes_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let output = Output { pretty: false };

        run(Commands::Init { agents: 2, seed: Some(4) }, &path, &output).unwrap();
        assert!(path.exists());

        let err = run(
            Commands::Update { agent_id: "agent_0".to_string(), score: "2".to_string() },
            &path,
            &output,
        )
        .unwrap_err();
        assert_eq!(exit_code(&err), 1);

        run(Commands::Reset, &path, &output).unwrap();
        assert!(!path.exists());
    }
}
