//! Configuration management for temperature sweeps
//!
//! A YAML file provides the run parameters, every field optional. Command-line
//! arguments override the file, and whatever is still missing is filled from
//! [`Config::default`].

mod args;

pub use args::Args;

use ising_sweep::{SweepRequest, UpdateRule};
use serde::{Deserialize, Serialize};

/// Main configuration structure for a sweep
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub lattice_size: Option<usize>,
    pub temperatures: Option<TemperatureGrid>,
    pub equilibration_steps: Option<usize>,
    pub averaging_steps: Option<usize>,
    pub workers: Option<usize>,
    pub update_rule: Option<UpdateRule>,
    pub seed: Option<u64>,
    pub output: Option<String>,
}

/// Evenly spaced temperatures from `min` to `max`, both ends included
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TemperatureGrid {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub points: Option<usize>,
}

impl Default for TemperatureGrid {
    fn default() -> Self {
        TemperatureGrid {
            min: Some(0.1),
            max: Some(5.0),
            points: Some(400),
        }
    }
}

impl TemperatureGrid {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.min.is_none() {
            self.min = defaults.min;
        }
        if self.max.is_none() {
            self.max = defaults.max;
        }
        if self.points.is_none() {
            self.points = defaults.points;
        }
        self
    }

    /// Expand the grid into its temperatures.
    pub fn values(&self) -> Vec<f64> {
        let defaults = Self::default();
        let min = self.min.or(defaults.min).unwrap_or_default();
        let max = self.max.or(defaults.max).unwrap_or_default();
        let points = self.points.or(defaults.points).unwrap_or_default();
        match points {
            0 => Vec::new(),
            1 => vec![min],
            _ => {
                let dt = (max - min) / (points - 1) as f64;
                (0..points).map(|i| min + dt * i as f64).collect()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lattice_size: Some(64),
            temperatures: Some(TemperatureGrid::default()),
            equilibration_steps: Some(1000),
            averaging_steps: Some(100),
            workers: Some(default_workers()),
            update_rule: Some(UpdateRule::default()),
            seed: Some(12345),
            output: Some("data.csv".to_string()),
        }
    }
}

impl Config {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.lattice_size.is_none() {
            self.lattice_size = defaults.lattice_size;
        }
        self.temperatures = Some(self.temperatures.unwrap_or_default().with_defaults());
        if self.equilibration_steps.is_none() {
            self.equilibration_steps = defaults.equilibration_steps;
        }
        if self.averaging_steps.is_none() {
            self.averaging_steps = defaults.averaging_steps;
        }
        if self.workers.is_none() {
            self.workers = defaults.workers;
        }
        if self.update_rule.is_none() {
            self.update_rule = defaults.update_rule;
        }
        if self.seed.is_none() {
            self.seed = defaults.seed;
        }
        if self.output.is_none() {
            self.output = defaults.output;
        }
        self
    }

    /// Override configuration values with those given on the command line
    pub fn apply_args(mut self, args: &Args) -> Self {
        self.lattice_size = args.lattice_size.or(self.lattice_size);
        let grid = self.temperatures.get_or_insert(TemperatureGrid {
            min: None,
            max: None,
            points: None,
        });
        grid.min = args.t_min.or(grid.min);
        grid.max = args.t_max.or(grid.max);
        grid.points = args.points.or(grid.points);
        self.equilibration_steps = args.equilibration_steps.or(self.equilibration_steps);
        self.averaging_steps = args.averaging_steps.or(self.averaging_steps);
        self.workers = args.workers.or(self.workers);
        self.update_rule = args.update_rule.or(self.update_rule);
        self.seed = args.seed.or(self.seed);
        self.output = args.output.clone().or(self.output);
        self
    }

    /// Build the library request; missing values fall back to the defaults.
    pub fn to_request(&self) -> SweepRequest {
        let defaults = Self::default();
        SweepRequest {
            temperatures: self.temperatures.clone().unwrap_or_default().values(),
            lattice_size: self.lattice_size.or(defaults.lattice_size).unwrap_or_default(),
            equilibration_steps: self
                .equilibration_steps
                .or(defaults.equilibration_steps)
                .unwrap_or_default(),
            averaging_steps: self
                .averaging_steps
                .or(defaults.averaging_steps)
                .unwrap_or_default(),
            workers: self.workers.or(defaults.workers).unwrap_or(1),
            update_rule: self.update_rule.unwrap_or_default(),
            seed: self.seed.or(defaults.seed).unwrap_or_default(),
        }
    }

    pub fn output_path(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| "data.csv".to_string())
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
