//! Tourney Core - Thompson-sampling tournament engine
//!
//! This crate decides which of N agents to evaluate next and when the
//! evidence names a winner:
//! - Seeded ChaCha stream whose position persists across processes
//! - Gaussian posterior per agent (Welford running mean/variance)
//! - Thompson sampling selection with lowest-index tie breaking
//! - Convergence estimate (leader, progress, remaining evaluations)
//! - Single-slot JSON state store with atomic replace
//!
//! Running agents and scoring them is left to the caller; the engine only
//! consumes scores in [0, 1].

pub mod config;
pub mod convergence;
pub mod engine;
pub mod error;
pub mod posterior;
pub mod rng;
pub mod selection;
pub mod state;
pub mod store;

// Re-exports for convenient access
pub use config::{EngineConfig, DEFAULT_STATE_FILE, STATE_PATH_ENV};
pub use convergence::{estimate_convergence, ConvergenceEstimate};
pub use engine::{
    parse_score, AgentStatus, Engine, InitReport, ResetReport, Selection, StatusReport,
    UpdateReport, WinnerReport,
};
pub use error::{Result, TournamentError};
pub use posterior::{agent_id, AgentRecord, Posterior};
pub use rng::{RngState, TournamentRng};
pub use selection::thompson_select;
pub use state::TournamentState;
pub use store::StateStore;
