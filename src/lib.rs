//! Monte Carlo temperature sweeps of the 2D Ising model.
//!
//! The engine keeps a periodic spin [`Lattice`], advances it with one of two
//! [`UpdateRule`]s inside a [`Simulation`] that tracks energy and
//! magnetization incrementally, and spreads a grid of temperatures over a pool
//! of worker threads with [`SweepDispatcher`].

pub mod analysis;
pub mod error;
pub mod lattice;
pub mod queue;
pub mod seed;
pub mod simulation;
pub mod sweep;
pub mod update;

pub use error::{IsingError, Result};
pub use lattice::Lattice;
pub use queue::PropagationQueue;
pub use simulation::{Observables, Simulation};
pub use sweep::{sort_by_temperature, SweepDispatcher, SweepRequest, SweepResult};
pub use update::{MagnetizationStatistic, StepOutcome, UpdateRule};
