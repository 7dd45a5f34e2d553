//! Tournament state - the single persisted aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TournamentError};
use crate::posterior::{agent_id, is_valid_score, AgentRecord};
use crate::rng::{RngState, TournamentRng};

/// Schema version written into every state document
pub const STATE_VERSION: u32 = 1;

/// Everything one tournament needs to continue in the next process
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentState {
    pub version: u32,
    pub agent_count: usize,
    pub seed: u64,
    pub rng_state: RngState,
    pub agents: Vec<AgentRecord>,
    pub total_evaluations: u64,
    pub created_at: DateTime<Utc>,
}

impl TournamentState {
    /// Create a fresh tournament with `agent_count` unevaluated agents
    pub fn new(agent_count: usize, seed: u64) -> Result<Self> {
        if agent_count == 0 {
            return Err(TournamentError::Usage(
                "--agents must be a positive integer".to_string(),
            ));
        }

        let mut agents = Vec::new();
        agents.try_reserve_exact(agent_count).map_err(|_| {
            TournamentError::Usage(format!("--agents {} is too large to allocate", agent_count))
        })?;
        agents.extend((0..agent_count).map(AgentRecord::new));

        Ok(Self {
            version: STATE_VERSION,
            agent_count,
            seed,
            rng_state: RngState::fresh(seed),
            agents,
            total_evaluations: 0,
            created_at: Utc::now(),
        })
    }

    /// Resolve `agent_{index}` to an index, rejecting anything else
    pub fn agent_index(&self, id: &str) -> Result<usize> {
        let unknown = || TournamentError::UnknownAgent {
            id: id.to_string(),
            agent_count: self.agent_count,
        };

        let index: usize = id
            .strip_prefix("agent_")
            .and_then(|suffix| suffix.parse().ok())
            .ok_or_else(unknown)?;

        // "agent_01" and "agent_+1" parse but are not canonical ids
        if index >= self.agent_count || agent_id(index) != id {
            return Err(unknown());
        }
        Ok(index)
    }

    /// Generator positioned where the last `select` left off
    pub fn rng(&self) -> TournamentRng {
        TournamentRng::restore(self.rng_state)
    }

    /// Store the generator position after a `select`
    pub fn commit_rng(&mut self, rng: &TournamentRng) {
        self.rng_state = rng.snapshot();
    }

    /// Record a score for one agent, keeping `total_evaluations` in step
    pub fn record_score(&mut self, index: usize, score: f64) -> Result<&AgentRecord> {
        let agent_count = self.agent_count;
        let record = self
            .agents
            .get_mut(index)
            .ok_or_else(|| TournamentError::UnknownAgent {
                id: agent_id(index),
                agent_count,
            })?;
        record.record(score)?;
        self.total_evaluations += 1;
        Ok(&self.agents[index])
    }

    /// Check the structural invariants of a loaded document.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.version != STATE_VERSION {
            return Err(format!(
                "unsupported state version {} (expected {})",
                self.version, STATE_VERSION
            ));
        }
        if self.agent_count == 0 {
            return Err("agent_count must be positive".to_string());
        }
        if self.agents.len() != self.agent_count {
            return Err(format!(
                "agent_count is {} but {} agent records are stored",
                self.agent_count,
                self.agents.len()
            ));
        }
        if self.rng_state.seed != self.seed {
            return Err(format!(
                "rng_state seed {} does not match tournament seed {}",
                self.rng_state.seed, self.seed
            ));
        }

        let mut sum = 0u64;
        for (index, agent) in self.agents.iter().enumerate() {
            if agent.id != agent_id(index) {
                return Err(format!(
                    "record {} has id {:?}, expected {:?}",
                    index,
                    agent.id,
                    agent_id(index)
                ));
            }
            if !(agent.mean.is_finite() && agent.m2.is_finite() && agent.m2 >= 0.0) {
                return Err(format!(
                    "{} has invalid statistics (mean {}, m2 {})",
                    agent.id, agent.mean, agent.m2
                ));
            }
            match agent.evaluation_count {
                0 if agent.mean != 0.0 || agent.m2 != 0.0 => {
                    return Err(format!("{} has statistics but no evaluations", agent.id));
                }
                1 if agent.m2 != 0.0 => {
                    return Err(format!("{} has m2 {} after one evaluation", agent.id, agent.m2));
                }
                n if n > 0 && !is_valid_score(agent.mean) => {
                    return Err(format!("{} has mean {} outside [0, 1]", agent.id, agent.mean));
                }
                _ => {}
            }
            sum = sum.saturating_add(agent.evaluation_count);
        }
        if sum != self.total_evaluations {
            return Err(format!(
                "total_evaluations is {} but agents sum to {}",
                self.total_evaluations, sum
            ));
        }
        Ok(())
    }
}
