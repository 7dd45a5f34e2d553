//! Command dispatcher - the init/select/update/status/winner/reset state machine
//!
//! Each operation loads the slot, validates, mutates in memory and saves
//! once. Validation always happens before the save, so a rejected command
//! leaves the persisted file untouched.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Engine operations (one per CLI command)
//! - Level 2: load_initialized, report builders
//! - Level 3: selection, posterior and convergence modules
//! - Level 4: argument parsing helpers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::convergence::estimate_convergence;
use crate::error::{Result, TournamentError};
use crate::posterior::agent_id;
use crate::rng::entropy_seed;
use crate::selection::thompson_select;
use crate::state::TournamentState;
use crate::store::StateStore;

// ============================================================================
// REPORTS
// ============================================================================

/// Acknowledgement for `init`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitReport {
    pub status: String,
    pub agents: usize,
    pub seed: u64,
}

/// Result of `select`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub agent_id: String,
}

/// Acknowledgement for `update`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub status: String,
    pub agent_id: String,
    pub evaluations: u64,
    pub mean_score: f64,
}

/// One row of the `status` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: String,
    pub evaluations: u64,
    /// Observed mean, absent until the agent has been scored
    pub mean_score: Option<f64>,
    /// Posterior std-dev of the agent's mean
    pub std_dev: f64,
}

/// Full statistics snapshot for `status`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub agent_count: usize,
    pub seed: u64,
    pub created_at: DateTime<Utc>,
    pub agents: Vec<AgentStatus>,
    pub total_evaluations: u64,
    pub leader_id: String,
    pub convergence_progress: f64,
    pub estimated_evaluations_remaining: u64,
}

/// Result of `winner`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinnerReport {
    pub winner_id: String,
    pub complete: bool,
}

/// Acknowledgement for `reset`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResetReport {
    pub status: String,
    /// Whether a tournament existed before the reset
    pub cleared: bool,
}

// ============================================================================
// LEVEL 1 - OPERATIONS
// ============================================================================

/// Tournament engine bound to one state slot
#[derive(Clone, Debug)]
pub struct Engine {
    store: StateStore,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine, rejecting invalid statistical configuration
    pub fn new(store: StateStore, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a new tournament, replacing whatever the slot held
    pub fn init(&self, agents: usize, seed: Option<u64>) -> Result<InitReport> {
        if agents > self.config.max_agents {
            return Err(TournamentError::Usage(format!(
                "--agents must be at most {}, got {}",
                self.config.max_agents, agents
            )));
        }
        let seed = seed.unwrap_or_else(entropy_seed);
        let state = TournamentState::new(agents, seed)?;
        self.store.save(&state)?;

        tracing::info!("Initialized tournament: agents={}, seed={}", agents, seed);
        Ok(InitReport {
            status: "initialized".to_string(),
            agents,
            seed,
        })
    }

    /// Choose the next agent to evaluate (advances the RNG only)
    pub fn select(&self) -> Result<Selection> {
        let mut state = self.load_initialized()?;

        let mut rng = state.rng();
        let chosen = thompson_select(&state.agents, &self.config, &mut rng);
        state.commit_rng(&rng);
        self.store.save(&state)?;

        let agent_id = agent_id(chosen);
        tracing::info!("Selected {}", agent_id);
        Ok(Selection { agent_id })
    }

    /// Record a score for one agent
    pub fn update(&self, agent: &str, score: f64) -> Result<UpdateReport> {
        if !crate::posterior::is_valid_score(score) {
            return Err(TournamentError::InvalidScore {
                input: score.to_string(),
            });
        }

        let mut state = self.load_initialized()?;
        let index = state.agent_index(agent)?;
        let record = state.record_score(index, score)?.clone();
        self.store.save(&state)?;

        tracing::info!(
            "Recorded score {} for {} (n={}, mean={:.4})",
            score,
            record.id,
            record.evaluation_count,
            record.mean
        );
        Ok(UpdateReport {
            status: "updated".to_string(),
            agent_id: record.id,
            evaluations: record.evaluation_count,
            mean_score: record.mean,
        })
    }

    /// Per-agent statistics plus convergence
    pub fn status(&self) -> Result<StatusReport> {
        let state = self.load_initialized()?;
        Ok(self.build_status(&state))
    }

    /// Current leader and whether it is settled
    pub fn winner(&self) -> Result<WinnerReport> {
        let state = self.load_initialized()?;
        let estimate = estimate_convergence(&state.agents, state.total_evaluations, &self.config);
        Ok(WinnerReport {
            winner_id: agent_id(estimate.leader),
            complete: estimate.complete,
        })
    }

    /// Empty the slot. Succeeds whether or not a tournament existed.
    ///
    /// A filesystem failure while removing the file is logged, not returned.
    pub fn reset(&self) -> ResetReport {
        let cleared = match self.store.clear() {
            Ok(cleared) => cleared,
            Err(e) => {
                tracing::warn!("Reset could not remove state: {}", e);
                false
            }
        };
        tracing::info!("Reset tournament (existed: {})", cleared);
        ResetReport {
            status: "reset".to_string(),
            cleared,
        }
    }

    // ========================================================================
    // LEVEL 2 - HELPERS
    // ========================================================================

    fn load_initialized(&self) -> Result<TournamentState> {
        self.store.load()?.ok_or(TournamentError::NotInitialized)
    }

    fn build_status(&self, state: &TournamentState) -> StatusReport {
        let estimate = estimate_convergence(&state.agents, state.total_evaluations, &self.config);
        let agents = state
            .agents
            .iter()
            .map(|agent| AgentStatus {
                id: agent.id.clone(),
                evaluations: agent.evaluation_count,
                mean_score: agent.is_evaluated().then_some(agent.mean),
                std_dev: agent.posterior(&self.config).std_dev,
            })
            .collect();

        StatusReport {
            agent_count: state.agent_count,
            seed: state.seed,
            created_at: state.created_at,
            agents,
            total_evaluations: state.total_evaluations,
            leader_id: agent_id(estimate.leader),
            convergence_progress: estimate.progress,
            estimated_evaluations_remaining: estimate.estimated_evaluations_remaining,
        }
    }
}

// ============================================================================
// LEVEL 4 - ARGUMENT PARSING
// ============================================================================

/// Parse a CLI score, requiring a finite number in [0, 1]
pub fn parse_score(input: &str) -> Result<f64> {
    match input.trim().parse::<f64>() {
        Ok(score) if crate::posterior::is_valid_score(score) => Ok(score),
        _ => Err(TournamentError::InvalidScore {
            input: input.to_string(),
        }),
    }
}
