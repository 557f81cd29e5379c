//! Parallel temperature sweep.
//!
//! A fixed pool of worker threads pulls temperature points from a bounded task
//! channel, runs [`Simulation::ensemble_average`] on a simulation it owns
//! exclusively, and pushes one [`SweepResult`] per point into a result channel.
//! Each worker stops when it reads a stop sentinel. Nothing but the
//! two channels is shared between threads.
//!
//! Every point restarts from the ground state with a seed derived from the
//! master seed and the point's index, so the set of results does not depend on
//! the number of workers or on scheduling. Results arrive in completion order.
//!
//! A worker that returns an error forwards it and the sweep fails with it. A
//! worker that panics drops its result sender; once every sender is gone the
//! dispatcher reports [`IsingError::WorkerFailed`] instead of waiting forever.
//! A worker that hangs still stalls the sweep, as there is no timeout.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{IsingError, Result};
use crate::seed::derive_point_seed;
use crate::simulation::Simulation;
use crate::update::UpdateRule;

/// Parameters of one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRequest {
    /// Temperatures to simulate, in any order.
    pub temperatures: Vec<f64>,
    /// Linear lattice size N.
    pub lattice_size: usize,
    /// Updates discarded before sampling at each temperature.
    pub equilibration_steps: usize,
    /// Updates sampled at each temperature.
    pub averaging_steps: usize,
    /// Number of worker threads.
    pub workers: usize,
    pub update_rule: UpdateRule,
    /// Master seed; per-point seeds are derived from it.
    pub seed: u64,
}

impl SweepRequest {
    /// Check every parameter before any thread is started.
    pub fn validate(&self) -> Result<()> {
        if self.lattice_size == 0 {
            return Err(IsingError::config("lattice_size", "must be positive"));
        }
        if self.equilibration_steps == 0 {
            return Err(IsingError::config("equilibration_steps", "must be positive"));
        }
        if self.averaging_steps == 0 {
            return Err(IsingError::config("averaging_steps", "must be positive"));
        }
        if self.workers == 0 {
            return Err(IsingError::config("workers", "at least one worker is required"));
        }
        if self.temperatures.is_empty() {
            return Err(IsingError::config("temperatures", "no temperatures to sweep"));
        }
        if let Some(t) = self
            .temperatures
            .iter()
            .find(|t| !t.is_finite() || **t <= 0.0)
        {
            return Err(IsingError::config(
                "temperatures",
                format!("temperature {t} is not a positive finite number"),
            ));
        }
        Ok(())
    }
}

/// Averaged observables at one temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    #[serde(rename = "T")]
    pub temperature: f64,
    #[serde(rename = "M")]
    pub magnetization: f64,
    #[serde(rename = "U")]
    pub energy: f64,
}

/// Work item sent to the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Task {
    Point { index: usize, temperature: f64 },
    Stop,
}

/// Per-worker copy of the run parameters.
#[derive(Debug, Clone, Copy)]
struct WorkerParams {
    lattice_size: usize,
    equilibration_steps: usize,
    averaging_steps: usize,
    update_rule: UpdateRule,
    seed: u64,
}

/// Fans temperature points out to a worker pool and collects the results.
#[derive(Debug, Clone)]
pub struct SweepDispatcher {
    request: SweepRequest,
}

impl SweepDispatcher {
    pub fn new(request: SweepRequest) -> Result<Self> {
        request.validate()?;
        Ok(Self { request })
    }

    pub fn request(&self) -> &SweepRequest {
        &self.request
    }

    /// Run the sweep and block until one result per temperature has arrived.
    pub fn run(&self) -> Result<Vec<SweepResult>> {
        let request = &self.request;
        let expected = request.temperatures.len();
        let workers = request.workers.min(expected);
        let params = WorkerParams {
            lattice_size: request.lattice_size,
            equilibration_steps: request.equilibration_steps,
            averaging_steps: request.averaging_steps,
            update_rule: request.update_rule,
            seed: request.seed,
        };

        info!(
            points = expected,
            workers,
            lattice_size = request.lattice_size,
            rule = %request.update_rule,
            "starting temperature sweep"
        );

        let (task_tx, task_rx) = bounded::<Task>(workers);
        // Room for every point plus one start-up failure per worker, so no worker
        // ever blocks on a result while tasks are still being fed.
        let (result_tx, result_rx) = bounded::<Result<SweepResult>>(expected + workers);

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let tasks = task_rx.clone();
            let results = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("sweep-worker-{id}"))
                .spawn(move || worker_loop(id, params, tasks, results))?;
            handles.push(handle);
        }
        // Only the workers may keep the channels open.
        drop(task_rx);
        drop(result_tx);

        feed_tasks(&task_tx, &request.temperatures, workers);
        drop(task_tx);

        let collected = collect_results(&result_rx, expected);
        drop(result_rx);
        join_workers(handles);

        let results = collected?;
        info!(points = results.len(), "temperature sweep finished");
        Ok(results)
    }
}

fn feed_tasks(tasks: &Sender<Task>, temperatures: &[f64], workers: usize) {
    let points = temperatures
        .iter()
        .enumerate()
        .map(|(index, &temperature)| Task::Point { index, temperature });
    for task in points.chain(std::iter::repeat(Task::Stop).take(workers)) {
        if tasks.send(task).is_err() {
            // Every worker is gone; the collector reports the failure.
            warn!("no sweep worker left to accept tasks");
            break;
        }
    }
}

fn collect_results(
    results: &Receiver<Result<SweepResult>>,
    expected: usize,
) -> Result<Vec<SweepResult>> {
    let mut collected = Vec::with_capacity(expected);
    while collected.len() < expected {
        match results.recv() {
            Ok(Ok(result)) => collected.push(result),
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                return Err(IsingError::WorkerFailed {
                    collected: collected.len(),
                    expected,
                })
            }
        }
    }
    Ok(collected)
}

fn join_workers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let name = handle.thread().name().unwrap_or("sweep-worker").to_string();
        if handle.join().is_err() {
            warn!(worker = %name, "sweep worker panicked");
        }
    }
}

fn worker_loop(
    id: usize,
    params: WorkerParams,
    tasks: Receiver<Task>,
    results: Sender<Result<SweepResult>>,
) {
    let mut sim = match Simulation::new(params.lattice_size, params.update_rule, params.seed) {
        Ok(sim) => sim,
        Err(err) => {
            let _ = results.send(Err(err));
            return;
        }
    };

    let mut completed = 0usize;
    for task in tasks.iter() {
        let (index, temperature) = match task {
            Task::Point { index, temperature } => (index, temperature),
            Task::Stop => break,
        };
        if temperature % 0.1 < 0.01 {
            info!(worker = id, temperature, "sweep progress");
        }

        sim.reset(derive_point_seed(params.seed, index as u64));
        let outcome = sim
            .ensemble_average(
                1.0 / temperature,
                params.equilibration_steps,
                params.averaging_steps,
            )
            .map(|obs| SweepResult {
                temperature,
                magnetization: obs.magnetization,
                energy: obs.energy,
            });
        let failed = outcome.is_err();
        if let Ok(result) = &outcome {
            debug!(
                worker = id,
                temperature,
                magnetization = result.magnetization,
                energy = result.energy,
                "temperature point done"
            );
        }
        if results.send(outcome).is_err() || failed {
            break;
        }
        completed += 1;
    }
    debug!(worker = id, completed, "sweep worker exiting");
}

/// Sort results by ascending temperature.
pub fn sort_by_temperature(results: &mut [SweepResult]) {
    results.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(temperatures: Vec<f64>, workers: usize) -> SweepRequest {
        SweepRequest {
            temperatures,
            lattice_size: 4,
            equilibration_steps: 10,
            averaging_steps: 10,
            workers,
            update_rule: UpdateRule::Cascade,
            seed: 17,
        }
    }

    #[test]
    fn test_sweep_returns_every_temperature() {
        let dispatcher = SweepDispatcher::new(request(vec![0.5, 1.0, 2.0], 2)).unwrap();
        let mut results = dispatcher.run().unwrap();
        assert_eq!(results.len(), 3);

        sort_by_temperature(&mut results);
        let temps: Vec<f64> = results.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_more_workers_than_points() {
        let dispatcher = SweepDispatcher::new(request(vec![1.5], 8)).unwrap();
        let results = dispatcher.run().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].temperature, 1.5);
    }

    #[test]
    fn test_invalid_requests_rejected() {
        let mut bad = request(vec![1.0], 0);
        assert!(matches!(
            SweepDispatcher::new(bad.clone()),
            Err(IsingError::Config { parameter: "workers", .. })
        ));

        bad.workers = 1;
        bad.lattice_size = 0;
        assert!(SweepDispatcher::new(bad.clone()).is_err());

        bad.lattice_size = 4;
        bad.averaging_steps = 0;
        assert!(SweepDispatcher::new(bad.clone()).is_err());

        bad.averaging_steps = 10;
        bad.equilibration_steps = 0;
        assert!(SweepDispatcher::new(bad.clone()).is_err());

        bad.equilibration_steps = 10;
        bad.temperatures = vec![];
        assert!(SweepDispatcher::new(bad.clone()).is_err());

        bad.temperatures = vec![1.0, 0.0];
        assert!(SweepDispatcher::new(bad.clone()).is_err());

        bad.temperatures = vec![f64::NAN];
        assert!(SweepDispatcher::new(bad).is_err());
    }

    #[test]
    fn test_collector_reports_closed_channel() {
        let (tx, rx) = bounded::<Result<SweepResult>>(4);
        tx.send(Ok(SweepResult {
            temperature: 1.0,
            magnetization: 0.0,
            energy: 0.0,
        }))
        .unwrap();
        drop(tx);

        match collect_results(&rx, 3) {
            Err(IsingError::WorkerFailed {
                collected,
                expected,
            }) => {
                assert_eq!(collected, 1);
                assert_eq!(expected, 3);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_collector_forwards_worker_error() {
        let (tx, rx) = bounded::<Result<SweepResult>>(1);
        tx.send(Err(IsingError::Internal("queue overflow".into())))
            .unwrap();
        assert!(matches!(
            collect_results(&rx, 2),
            Err(IsingError::Internal(_))
        ));
    }

    #[test]
    fn test_sort_by_temperature() {
        let mut results: Vec<SweepResult> = [2.0, 0.5, 1.0]
            .iter()
            .map(|&temperature| SweepResult {
                temperature,
                magnetization: 0.0,
                energy: 0.0,
            })
            .collect();
        sort_by_temperature(&mut results);
        assert_eq!(results[0].temperature, 0.5);
        assert_eq!(results[2].temperature, 2.0);
    }
}
