//! Command-line argument parsing for temperature sweeps

use clap::Parser;
use ising_sweep::UpdateRule;

/// Monte Carlo temperature sweep of the 2D Ising model
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "sweep.yaml")]
    pub config_file: String,

    /// Override linear lattice size N
    #[arg(long)]
    pub lattice_size: Option<usize>,

    /// Override lowest temperature of the grid
    #[arg(long)]
    pub t_min: Option<f64>,

    /// Override highest temperature of the grid
    #[arg(long)]
    pub t_max: Option<f64>,

    /// Override number of temperature points
    #[arg(long)]
    pub points: Option<usize>,

    /// Override equilibration steps per temperature
    #[arg(long)]
    pub equilibration_steps: Option<usize>,

    /// Override averaging steps per temperature
    #[arg(long)]
    pub averaging_steps: Option<usize>,

    /// Override number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Update rule (metropolis or cascade)
    #[arg(long)]
    pub update_rule: Option<UpdateRule>,

    /// Override master seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override results file (CSV)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write the log to this file instead of stdout
    #[arg(long)]
    pub log_file: Option<String>,
}
