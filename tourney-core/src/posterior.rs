//! Gaussian posterior model - per-agent running statistics
//!
//! Each agent keeps only three numbers (count, mean, Welford M2), so the
//! model is O(1) per agent and never needs the raw score history.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Result, TournamentError};

/// Statistics for one competing agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// `agent_{index}`, fixed at creation
    pub id: String,
    /// Number of scores recorded
    pub evaluation_count: u64,
    /// Running mean of recorded scores
    pub mean: f64,
    /// Sum of squared deviations from the mean (Welford accumulator)
    pub m2: f64,
}

/// Current belief about an agent's true mean score
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Posterior {
    pub mean: f64,
    pub std_dev: f64,
}

impl AgentRecord {
    /// Create an unevaluated record for the agent at `index`
    pub fn new(index: usize) -> Self {
        Self {
            id: agent_id(index),
            evaluation_count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Has this agent been scored at least once?
    pub fn is_evaluated(&self) -> bool {
        self.evaluation_count > 0
    }

    /// Record one score, updating count, mean and M2 together.
    ///
    /// Scores outside [0, 1] (including NaN) are rejected and leave the
    /// record untouched.
    pub fn record(&mut self, score: f64) -> Result<()> {
        if !is_valid_score(score) {
            return Err(TournamentError::InvalidScore {
                input: score.to_string(),
            });
        }

        self.evaluation_count += 1;
        let delta = score - self.mean;
        self.mean += delta / self.evaluation_count as f64;
        let delta2 = score - self.mean;
        self.m2 += delta * delta2;
        Ok(())
    }

    /// Posterior over the agent's mean score.
    ///
    /// Unevaluated agents get the wide prior. Otherwise the score variance is
    /// `(m2 + prior_score_variance) / n` and the std-dev of the mean is
    /// `sqrt(variance / n)`. Noisy scores (m2 growing with n) shrink it as
    /// `1/sqrt(n)`; constant scores (m2 = 0) shrink it as `1/n`, since the
    /// pseudo-observation is diluted too. The floor applies in every case.
    pub fn posterior(&self, config: &EngineConfig) -> Posterior {
        if !self.is_evaluated() {
            return Posterior {
                mean: config.prior_mean,
                std_dev: config.prior_std_dev.max(config.min_std_dev),
            };
        }

        let n = self.evaluation_count as f64;
        let variance = (self.m2.max(0.0) + config.prior_score_variance) / n;
        let std_dev = (variance / n).sqrt();

        Posterior {
            mean: self.mean,
            std_dev: std_dev.max(config.min_std_dev),
        }
    }
}

/// Canonical id for the agent at `index`
pub fn agent_id(index: usize) -> String {
    format!("agent_{}", index)
}

/// Scores must be finite and lie in [0, 1]
pub fn is_valid_score(score: f64) -> bool {
    (0.0..=1.0).contains(&score)
}
