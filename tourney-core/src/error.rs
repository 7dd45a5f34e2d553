//! Error taxonomy for tournament commands
//!
//! Every variant maps to a stable process exit code so the orchestrator
//! driving the CLI can branch on failures without parsing messages.

use std::path::PathBuf;

/// Exit code for malformed arguments and invalid scores
pub const EXIT_USAGE: u8 = 1;
/// Exit code for stateful commands run before `init`
pub const EXIT_NOT_INITIALIZED: u8 = 2;
/// Exit code for agent ids outside the tournament
pub const EXIT_UNKNOWN_AGENT: u8 = 3;
/// Exit code for a state file that exists but cannot be trusted
pub const EXIT_STATE_CORRUPTION: u8 = 4;
/// Exit code for filesystem and encoding failures
pub const EXIT_IO: u8 = 5;

/// Errors raised by the tournament engine
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("invalid score {input:?}: expected a number in [0, 1]")]
    InvalidScore { input: String },

    #[error("tournament not initialized (run `init --agents <N>` first)")]
    NotInitialized,

    #[error("unknown agent {id:?}: tournament has agents agent_0..agent_{}", .agent_count.saturating_sub(1))]
    UnknownAgent { id: String, agent_count: usize },

    #[error("state file {} is corrupt: {reason}", .path.display())]
    StateCorruption { path: PathBuf, reason: String },

    #[error("state file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode tournament state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid engine configuration: {0}")]
    Config(String),
}

impl TournamentError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            TournamentError::Usage(_)
            | TournamentError::InvalidScore { .. }
            | TournamentError::Config(_) => EXIT_USAGE,
            TournamentError::NotInitialized => EXIT_NOT_INITIALIZED,
            TournamentError::UnknownAgent { .. } => EXIT_UNKNOWN_AGENT,
            TournamentError::StateCorruption { .. } => EXIT_STATE_CORRUPTION,
            TournamentError::Io { .. } | TournamentError::Encode(_) => EXIT_IO,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TournamentError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TournamentError::StateCorruption {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TournamentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(TournamentError::Usage("x".into()).exit_code(), 1);
        assert_eq!(
            TournamentError::InvalidScore { input: "1.5".into() }.exit_code(),
            1
        );
        assert_eq!(TournamentError::NotInitialized.exit_code(), 2);
        assert_eq!(
            TournamentError::UnknownAgent { id: "agent_9".into(), agent_count: 3 }.exit_code(),
            3
        );
        assert_eq!(TournamentError::corrupt("s.json", "bad").exit_code(), 4);
    }

    #[test]
    fn test_unknown_agent_message_names_range() {
        let err = TournamentError::UnknownAgent { id: "agent_99".into(), agent_count: 3 };
        let msg = err.to_string();
        assert!(msg.contains("agent_99"));
        assert!(msg.contains("agent_2"));
    }

    #[test]
    fn test_messages_are_single_line() {
        let err = TournamentError::corrupt("/tmp/state.json", "expected value at line 1 column 1");
        assert!(!err.to_string().contains('\n'));
    }
}
