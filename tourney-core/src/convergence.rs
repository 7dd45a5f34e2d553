//! Convergence estimation - leader, confidence and stopping signal
//!
//! ## Architecture
//! - Level 2: estimate_convergence (combines everything below)
//! - Level 3: leader_index, runner_up_index, separation
//! - Level 4: normal distribution helpers

use crate::config::EngineConfig;
use crate::posterior::AgentRecord;

/// Snapshot of how settled the tournament is
#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceEstimate {
    /// Agent with the highest observed mean
    pub leader: usize,
    /// Strongest competitor by posterior mean, if there is one
    pub runner_up: Option<usize>,
    /// Confidence in [0, 1] that the leader is truly best
    pub progress: f64,
    /// Whether progress crossed the threshold with enough evidence
    pub complete: bool,
    /// Heuristic count of further evaluations until completion
    pub estimated_evaluations_remaining: u64,
}

// ============================================================================
// Level 2 - Estimation
// ============================================================================

/// Derive the convergence snapshot from the current agent statistics
pub fn estimate_convergence(
    agents: &[AgentRecord],
    total_evaluations: u64,
    config: &EngineConfig,
) -> ConvergenceEstimate {
    let leader = leader_index(agents);

    if agents.len() <= 1 {
        return ConvergenceEstimate {
            leader,
            runner_up: None,
            progress: 1.0,
            complete: true,
            estimated_evaluations_remaining: 0,
        };
    }

    let runner_up = runner_up_index(agents, leader, config);
    let z = if agents[leader].is_evaluated() {
        separation(&agents[leader], &agents[runner_up], config)
    } else {
        0.0
    };
    let progress = (2.0 * normal_cdf(z) - 1.0).clamp(0.0, 1.0);

    let leader_evals = agents[leader].evaluation_count;
    let complete = progress >= config.convergence_threshold
        && leader_evals >= config.min_evaluations_to_complete;

    let estimated_evaluations_remaining = if complete {
        0
    } else {
        estimate_remaining(z, agents.len(), total_evaluations, leader_evals, config)
    };

    ConvergenceEstimate {
        leader,
        runner_up: Some(runner_up),
        progress,
        complete,
        estimated_evaluations_remaining,
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Highest observed mean among evaluated agents, lowest index on ties.
///
/// Falls back to agent 0 when nothing has been evaluated.
pub fn leader_index(agents: &[AgentRecord]) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (idx, agent) in agents.iter().enumerate() {
        if !agent.is_evaluated() {
            continue;
        }
        match best {
            Some((_, mean)) if agent.mean <= mean => {}
            _ => best = Some((idx, agent.mean)),
        }
    }
    best.map(|(idx, _)| idx).unwrap_or(0)
}

/// Best non-leader agent by posterior mean (prior mean when unevaluated)
fn runner_up_index(agents: &[AgentRecord], leader: usize, config: &EngineConfig) -> usize {
    let mut best_idx = if leader == 0 { 1 } else { 0 };
    let mut best_mean = f64::NEG_INFINITY;
    for (idx, agent) in agents.iter().enumerate() {
        if idx == leader {
            continue;
        }
        let mean = agent.posterior(config).mean;
        if mean > best_mean {
            best_idx = idx;
            best_mean = mean;
        }
    }
    best_idx
}

/// Gap between two posteriors in units of their combined std-dev
fn separation(leader: &AgentRecord, other: &AgentRecord, config: &EngineConfig) -> f64 {
    let a = leader.posterior(config);
    let b = other.posterior(config);
    let spread = (a.std_dev.powi(2) + b.std_dev.powi(2)).sqrt();
    (a.mean - b.mean) / spread
}

/// Extrapolate remaining evaluations from the current separation.
///
/// Posterior std-devs shrink at least as 1/sqrt(n), so z grows at least as
/// sqrt(n) and (z_target / z)^2 bounds the evaluations still needed.
fn estimate_remaining(
    z: f64,
    agent_count: usize,
    total_evaluations: u64,
    leader_evals: u64,
    config: &EngineConfig,
) -> u64 {
    let min_for_leader = config
        .min_evaluations_to_complete
        .saturating_sub(leader_evals);

    let by_rate = if z > 0.0 && total_evaluations > 0 {
        let z_target = normal_quantile((1.0 + config.convergence_threshold) / 2.0);
        let factor = ((z_target / z).powi(2) - 1.0).max(0.0);
        let estimate = (total_evaluations as f64 * factor).ceil();
        if estimate.is_finite() && estimate < config.max_remaining_estimate as f64 {
            estimate as u64
        } else {
            config.max_remaining_estimate
        }
    } else {
        (agent_count as u64)
            .saturating_mul(config.min_evaluations_to_complete)
            .saturating_sub(total_evaluations)
    };

    by_rate.max(min_for_leader).max(1).min(config.max_remaining_estimate)
}

// ============================================================================
// Level 4 - Normal distribution helpers
// ============================================================================

/// Standard normal CDF
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Inverse standard normal CDF by bisection (p in (0, 1))
fn normal_quantile(p: f64) -> f64 {
    let (mut lo, mut hi) = (-10.0_f64, 10.0_f64);
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if normal_cdf(mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Error function, Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7)
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}
