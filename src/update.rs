//! Monte Carlo update rules.
//!
//! Two rules are provided. [`UpdateRule::Metropolis`] is the textbook single
//! spin-flip Metropolis step and satisfies detailed balance.
//! [`UpdateRule::Cascade`] grows a breadth-first avalanche of same-sign flips
//! from a random seed site. Each same-sign neighbour joins with probability
//! `1 - exp(-2 beta)`. This is a heuristic correlated move for faster
//! decorrelation at low temperature and is *not* a Wolff cluster update: the
//! seed flip is unconditional and no bond bookkeeping is done, so the sampled
//! distribution is only approximately Boltzmann.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{IsingError, Result};
use crate::lattice::Lattice;
use crate::queue::PropagationQueue;

/// Update rule applied once per Monte Carlo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateRule {
    /// Single spin-flip Metropolis.
    Metropolis,
    /// Breadth-first avalanche of same-sign flips (approximate).
    #[default]
    Cascade,
}

/// Statistic of the total magnetization reported by `time_average`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnetizationStatistic {
    /// Mean of `|M|`.
    Absolute,
    /// Square root of the mean of `M²`.
    RootMeanSquare,
}

/// Changes produced by one update step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// Change in total energy.
    pub delta_energy: i64,
    /// Change in total magnetization.
    pub delta_magnetization: i64,
    /// Number of spins flipped.
    pub flipped: usize,
    /// Number of flips that were proposed to the acceptance test.
    pub candidates: usize,
}

impl UpdateRule {
    /// Apply one step of this rule to `lattice`.
    ///
    /// `queue` is only touched by the cascade rule.
    pub fn step<R: Rng + ?Sized>(
        self,
        lattice: &mut Lattice,
        queue: &mut PropagationQueue,
        beta: f64,
        rng: &mut R,
    ) -> Result<StepOutcome> {
        match self {
            UpdateRule::Metropolis => Ok(metropolis_step(lattice, beta, rng)),
            UpdateRule::Cascade => cascade_step(lattice, queue, beta, rng),
        }
    }

    /// Magnetization statistic averaged for this rule.
    pub fn magnetization_statistic(self) -> MagnetizationStatistic {
        match self {
            UpdateRule::Metropolis => MagnetizationStatistic::Absolute,
            UpdateRule::Cascade => MagnetizationStatistic::RootMeanSquare,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateRule::Metropolis => "metropolis",
            UpdateRule::Cascade => "cascade",
        }
    }
}

impl fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateRule {
    type Err = IsingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "metropolis" => Ok(UpdateRule::Metropolis),
            "cascade" => Ok(UpdateRule::Cascade),
            other => Err(IsingError::config(
                "update_rule",
                format!("unknown rule '{other}', expected 'metropolis' or 'cascade'"),
            )),
        }
    }
}

/// One single spin-flip Metropolis step.
pub fn metropolis_step<R: Rng + ?Sized>(lattice: &mut Lattice, beta: f64, rng: &mut R) -> StepOutcome {
    let n = lattice.size();
    let i = rng.gen_range(0..n);
    let j = rng.gen_range(0..n);

    let delta_e = lattice.flip_energy_delta(i, j);

    if delta_e < 0 || rng.gen::<f64>() < (-beta * delta_e as f64).exp() {
        let s = lattice.flip(i, j);
        StepOutcome {
            delta_energy: delta_e as i64,
            delta_magnetization: -2 * s as i64,
            flipped: 1,
            candidates: 1,
        }
    } else {
        StepOutcome {
            candidates: 1,
            ..StepOutcome::default()
        }
    }
}

/// One cascading flip seeded at a random site.
pub fn cascade_step<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    queue: &mut PropagationQueue,
    beta: f64,
    rng: &mut R,
) -> Result<StepOutcome> {
    let n = lattice.size();
    let i = rng.gen_range(0..n);
    let j = rng.gen_range(0..n);

    let flip_prob = 1.0 - (-2.0 * beta).exp();

    queue.clear();
    let mut delta_e = lattice.flip_energy_delta(i, j) as i64;
    let s = lattice.flip(i, j);
    let mut delta_m = -2 * s as i64;
    let mut flipped = 1;
    let mut candidates = 1;

    lattice.push_neighbors(i, j, queue)?;

    while let Some((i, j)) = queue.pop() {
        // Sites already flipped in this cascade hold -s and drop out here.
        if lattice.spin(i, j) != s {
            continue;
        }
        candidates += 1;
        if rng.gen::<f64>() < flip_prob {
            delta_e += lattice.flip_energy_delta(i, j) as i64;
            delta_m -= 2 * s as i64;
            lattice.flip(i, j);
            flipped += 1;

            lattice.push_neighbors(i, j, queue)?;
        }
    }

    Ok(StepOutcome {
        delta_energy: delta_e,
        delta_magnetization: delta_m,
        flipped,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_metropolis_accepts_everything_at_infinite_temperature() {
        let mut lattice = Lattice::new(6).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let before = lattice.total_magnetization();
            let outcome = metropolis_step(&mut lattice, 0.0, &mut rng);
            assert_eq!(outcome.flipped, 1);
            assert_eq!(outcome.delta_magnetization.abs(), 2);
            assert_eq!(lattice.total_magnetization() - before, outcome.delta_magnetization);
        }
    }

    #[test]
    fn test_metropolis_frozen_at_zero_temperature_ground_state() {
        // From the ground state every flip costs +8, which beta = 50 never accepts.
        let mut lattice = Lattice::new(4).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let outcome = metropolis_step(&mut lattice, 50.0, &mut rng);
            assert_eq!(outcome, StepOutcome { candidates: 1, ..Default::default() });
        }
        assert_eq!(lattice, Lattice::new(4).unwrap());
    }

    #[test]
    fn test_cascade_floods_lattice_at_low_temperature() {
        let n = 8;
        let mut lattice = Lattice::new(n).unwrap();
        let mut queue = PropagationQueue::for_lattice(n).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = cascade_step(&mut lattice, &mut queue, 50.0, &mut rng).unwrap();

        assert_eq!(outcome.flipped, n * n);
        assert_eq!(outcome.flipped, outcome.candidates);
        assert_eq!(outcome.delta_magnetization, -2 * (n * n) as i64);
        // Uniform flip leaves the energy unchanged.
        assert_eq!(outcome.delta_energy, 0);
        assert!(lattice.spins().iter().all(|&s| s == -1));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cascade_is_single_flip_at_infinite_temperature() {
        let mut lattice = Lattice::new(5).unwrap();
        let mut queue = PropagationQueue::for_lattice(5).unwrap();
        let mut rng = StdRng::seed_from_u64(8);

        let outcome = cascade_step(&mut lattice, &mut queue, 0.0, &mut rng).unwrap();
        assert_eq!(outcome.flipped, 1);
        assert_eq!(outcome.delta_energy, 8);
        assert_eq!(outcome.delta_magnetization, -2);
        assert_eq!(outcome.candidates, 5);
    }

    #[test]
    fn test_cascade_deltas_match_recomputation() {
        let n = 6;
        let mut lattice = Lattice::new(n).unwrap();
        let mut queue = PropagationQueue::for_lattice(n).unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..200 {
            let e0 = lattice.total_energy();
            let m0 = lattice.total_magnetization();
            let outcome = cascade_step(&mut lattice, &mut queue, 0.45, &mut rng).unwrap();
            assert_eq!(lattice.total_energy() - e0, outcome.delta_energy);
            assert_eq!(lattice.total_magnetization() - m0, outcome.delta_magnetization);
        }
    }

    #[test]
    fn test_rule_parsing() {
        assert_eq!("Metropolis".parse::<UpdateRule>().unwrap(), UpdateRule::Metropolis);
        assert_eq!("cascade".parse::<UpdateRule>().unwrap(), UpdateRule::Cascade);
        assert!("wolff".parse::<UpdateRule>().is_err());
        assert_eq!(UpdateRule::Cascade.to_string(), "cascade");
    }

    #[test]
    fn test_statistic_follows_rule() {
        assert_eq!(
            UpdateRule::Metropolis.magnetization_statistic(),
            MagnetizationStatistic::Absolute
        );
        assert_eq!(
            UpdateRule::Cascade.magnetization_statistic(),
            MagnetizationStatistic::RootMeanSquare
        );
    }
}
