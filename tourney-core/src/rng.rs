//! Seeded random stream that survives process boundaries
//!
//! Every CLI invocation is a fresh process, so the generator cannot live in
//! memory between `select` calls. Instead its state is reduced to plain data
//! (`RngState`: the seed plus the ChaCha keystream position) that is stored
//! alongside the tournament and restored on the next load.
//!
//! ## Consumption contract
//! - `next_f64` consumes exactly one `u64` from the keystream.
//! - `sample_gaussian` consumes exactly two `next_f64` draws, always.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Serializable generator snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    /// Seed the ChaCha stream was built from
    pub seed: u64,
    /// Position in the keystream, in 32-bit words
    pub word_pos: u128,
}

impl RngState {
    /// State of a generator that has not produced anything yet
    pub fn fresh(seed: u64) -> Self {
        Self { seed, word_pos: 0 }
    }
}

/// Deterministic uniform/Gaussian source for the selection policy
#[derive(Clone, Debug)]
pub struct TournamentRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl TournamentRng {
    /// Create a generator positioned at the start of the seed's stream
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Rebuild a generator exactly where a previous process left it
    pub fn restore(state: RngState) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(state.seed);
        rng.set_word_pos(state.word_pos);
        Self {
            seed: state.seed,
            rng,
        }
    }

    /// Capture the current position for persistence
    pub fn snapshot(&self) -> RngState {
        RngState {
            seed: self.seed,
            word_pos: self.rng.get_word_pos(),
        }
    }

    /// Uniform float in [0, 1); never returns 1.0
    pub fn next_f64(&mut self) -> f64 {
        // rand's Standard f64 takes the top 53 bits of one u64
        self.rng.gen::<f64>()
    }

    /// Draw one sample from N(mean, std_dev) using Box-Muller.
    ///
    /// Always consumes two uniforms. The first is mapped into (0, 1] and
    /// floored at `f64::MIN_POSITIVE` so the logarithm stays finite, and the
    /// radicand is clamped at zero so rounding can never produce a NaN. A
    /// non-positive or non-finite `std_dev` degenerates to the mean.
    pub fn sample_gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = (1.0 - self.next_f64()).max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();

        let radius = (-2.0 * u1.ln()).max(0.0).sqrt();
        let z = radius * (TAU * u2).cos();

        let width = if std_dev.is_finite() && std_dev > 0.0 {
            std_dev
        } else {
            0.0
        };
        let sample = mean + width * z;
        if sample.is_finite() {
            sample
        } else {
            mean
        }
    }
}

/// Draw a fresh seed from OS entropy, used when `init` gets no `--seed`
pub fn entropy_seed() -> u64 {
    ChaCha8Rng::from_entropy().gen()
}
