//! Configuration types for the tournament engine
//!
//! Level 4 - Utilities and configuration

use crate::error::{Result, TournamentError};

/// Default state file name, resolved against the working directory
pub const DEFAULT_STATE_FILE: &str = "tournament_state.json";

/// Environment variable overriding the state file location
pub const STATE_PATH_ENV: &str = "TOURNEY_STATE";

/// Statistical parameters shared by the posterior, selection and convergence code
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Posterior mean reported for an agent with no evaluations
    pub prior_mean: f64,
    /// Posterior std-dev for an agent with no evaluations (deliberately wide)
    pub prior_std_dev: f64,
    /// Pseudo-observation added to the Welford accumulator (max variance on [0, 1])
    pub prior_score_variance: f64,
    /// Floor applied to every posterior std-dev
    pub min_std_dev: f64,
    /// Progress at which the tournament counts as converged
    pub convergence_threshold: f64,
    /// Evaluations the leader needs before `complete` can be reported
    pub min_evaluations_to_complete: u64,
    /// Upper bound on `estimated_evaluations_remaining`
    pub max_remaining_estimate: u64,
    /// Largest agent count `init` accepts
    pub max_agents: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prior_mean: 0.5,
            prior_std_dev: 1.0,
            prior_score_variance: 0.25,
            min_std_dev: 0.01,
            convergence_threshold: 0.95,
            min_evaluations_to_complete: 5,
            max_remaining_estimate: 10_000,
            max_agents: 100_000,
        }
    }
}

impl EngineConfig {
    /// Reject parameter combinations that would break sampling or convergence
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.prior_mean) {
            return Err(TournamentError::Config(format!(
                "prior_mean must lie in [0, 1], got {}",
                self.prior_mean
            )));
        }
        for (name, value) in [
            ("prior_std_dev", self.prior_std_dev),
            ("prior_score_variance", self.prior_score_variance),
            ("min_std_dev", self.min_std_dev),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TournamentError::Config(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if self.min_std_dev > self.prior_std_dev {
            return Err(TournamentError::Config(
                "min_std_dev cannot exceed prior_std_dev".to_string(),
            ));
        }
        if self.max_agents == 0 {
            return Err(TournamentError::Config("max_agents must be positive".to_string()));
        }
        if !(self.convergence_threshold > 0.0 && self.convergence_threshold < 1.0) {
            return Err(TournamentError::Config(format!(
                "convergence_threshold must lie in (0, 1), got {}",
                self.convergence_threshold
            )));
        }
        Ok(())
    }
}
