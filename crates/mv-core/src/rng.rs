//! Seeded random stream for one agent's wandering.
//!
//! Streams are derived from the run's seed and the agent's index:
//!
//!   stream seed = run seed XOR (agent index * golden-ratio constant)
//!
//! so two runs with the same seed wander identically, and neighbouring agents
//! still draw unrelated headings.  Movement actions never reach for a global
//! generator; the caller hands the agent's stream in, so tests inject a
//! seeded one and parallel workers never share state.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// Fractional part of the golden ratio in 64 bits.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// One agent's random stream.  `mv-agent` keeps one per agent next to the
/// store columns.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Stream for `agent` under run seed `global_seed`.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// The underlying generator, for `rand` distributions.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Heading perturbation drawn uniformly in
    /// `[-amplitude_deg / 2, amplitude_deg / 2]`.
    ///
    /// An amplitude of zero (or less) draws nothing and returns exactly `0.0`,
    /// so the RNG stream is not advanced for straight-line wandering.
    pub fn heading_offset(&mut self, amplitude_deg: f64) -> f64 {
        let half = amplitude_deg.abs() * 0.5;
        if half == 0.0 || !half.is_finite() {
            return 0.0;
        }
        self.0.gen_range(-half..=half)
    }
}
