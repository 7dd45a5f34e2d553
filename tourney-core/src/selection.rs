//! Thompson sampling selection policy
//!
//! Draws one sample from each agent's posterior and picks the highest.
//! Unevaluated agents carry the wide prior, so they win early draws often
//! enough that every agent is tried within a few rounds.

use crate::config::EngineConfig;
use crate::posterior::AgentRecord;
use crate::rng::TournamentRng;

/// Draw one posterior sample per agent, in index order.
///
/// Consumes exactly `2 * agents.len()` uniforms from `rng`.
pub fn draw_samples(
    agents: &[AgentRecord],
    config: &EngineConfig,
    rng: &mut TournamentRng,
) -> Vec<f64> {
    agents
        .iter()
        .map(|agent| {
            let posterior = agent.posterior(config);
            rng.sample_gaussian(posterior.mean, posterior.std_dev)
        })
        .collect()
}

/// Index of the largest sample; ties go to the lowest index.
///
/// Returns 0 for an empty slice.
pub fn argmax_lowest_index(samples: &[f64]) -> usize {
    let mut best_idx = 0;
    let mut best = f64::NEG_INFINITY;
    for (idx, &sample) in samples.iter().enumerate() {
        if sample > best {
            best_idx = idx;
            best = sample;
        }
    }
    best_idx
}

/// Pick the next agent to evaluate.
///
/// Only advances `rng`; agent statistics are never touched here.
pub fn thompson_select(
    agents: &[AgentRecord],
    config: &EngineConfig,
    rng: &mut TournamentRng,
) -> usize {
    let samples = draw_samples(agents, config, rng);
    let chosen = argmax_lowest_index(&samples);
    tracing::trace!("Thompson samples {:?} -> {}", samples, chosen);
    chosen
}
