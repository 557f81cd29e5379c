use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

use crate::error::{IsingError, Result};
use crate::lattice::Lattice;
use crate::queue::PropagationQueue;
use crate::update::{MagnetizationStatistic, StepOutcome, UpdateRule};

/// Time-averaged observables at one temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observables {
    /// Magnetization statistic selected by the update rule (`|M|` or RMS of `M`).
    pub magnetization: f64,
    /// Mean total energy.
    pub energy: f64,
}

/// Markov chain over one lattice.
///
/// The running energy and magnetization are updated from the per-step deltas
/// instead of being recomputed, and always agree with
/// [`Lattice::total_energy`] and [`Lattice::total_magnetization`] between steps.
#[derive(Debug, Clone)]
pub struct Simulation {
    lattice: Lattice,
    queue: PropagationQueue,
    rule: UpdateRule,
    rng: StdRng,
    energy: i64,
    magnetization: i64,
}

impl Simulation {
    /// Create an `n` x `n` simulation in the ground state with an explicitly seeded RNG.
    pub fn new(n: usize, rule: UpdateRule, seed: u64) -> Result<Self> {
        let lattice = Lattice::new(n)?;
        let queue = PropagationQueue::for_lattice(n)?;
        let energy = lattice.total_energy();
        let magnetization = lattice.total_magnetization();
        Ok(Self {
            lattice,
            queue,
            rule,
            rng: StdRng::seed_from_u64(seed),
            energy,
            magnetization,
        })
    }

    /// Return to the ground state and reseed, keeping all allocations.
    pub fn reset(&mut self, seed: u64) {
        self.lattice.reset();
        self.queue.clear();
        self.energy = self.lattice.total_energy();
        self.magnetization = self.lattice.total_magnetization();
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn update_rule(&self) -> UpdateRule {
        self.rule
    }

    /// Running total energy.
    pub fn total_energy(&self) -> i64 {
        self.energy
    }

    /// Running total magnetization.
    pub fn total_magnetization(&self) -> i64 {
        self.magnetization
    }

    /// Apply the update rule once and commit its deltas.
    pub fn step(&mut self, beta: f64) -> Result<StepOutcome> {
        let outcome = self
            .rule
            .step(&mut self.lattice, &mut self.queue, beta, &mut self.rng)?;
        self.energy += outcome.delta_energy;
        self.magnetization += outcome.delta_magnetization;
        Ok(outcome)
    }

    /// Equilibrate for `steps` updates without sampling.
    pub fn evolve(&mut self, steps: usize, beta: f64) -> Result<()> {
        for _ in 0..steps {
            self.step(beta)?;
        }
        trace!(
            steps,
            beta,
            energy = self.energy,
            magnetization = self.magnetization,
            "equilibration finished"
        );
        Ok(())
    }

    /// Sample the observables after each of `steps` updates and return their means.
    pub fn time_average(&mut self, steps: usize, beta: f64) -> Result<Observables> {
        if steps == 0 {
            return Err(IsingError::config(
                "averaging_steps",
                "at least one sample is required",
            ));
        }
        let statistic = self.rule.magnetization_statistic();

        let mut mag_total = 0.0;
        let mut energy_total = 0.0;
        for _ in 0..steps {
            self.step(beta)?;
            let m = self.magnetization as f64;
            mag_total += match statistic {
                MagnetizationStatistic::Absolute => m.abs(),
                MagnetizationStatistic::RootMeanSquare => m * m,
            };
            energy_total += self.energy as f64;
        }

        let samples = steps as f64;
        let mag_mean = mag_total / samples;
        let magnetization = match statistic {
            MagnetizationStatistic::Absolute => mag_mean,
            MagnetizationStatistic::RootMeanSquare => mag_mean.sqrt(),
        };
        Ok(Observables {
            magnetization,
            energy: energy_total / samples,
        })
    }

    /// Equilibrate, then time-average. The unit of work for one temperature.
    pub fn ensemble_average(
        &mut self,
        beta: f64,
        equilibration_steps: usize,
        averaging_steps: usize,
    ) -> Result<Observables> {
        self.evolve(equilibration_steps, beta)?;
        self.time_average(averaging_steps, beta)
    }
}
