//! Ising temperature sweep command-line interface
//!
//! Reads a YAML configuration, runs the sweep on a worker pool and writes the
//! averaged observables to a CSV file.

use color_eyre::eyre::Result;

mod app;
mod config;
mod io;

use app::SweepApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    SweepApplication::from_cli()?.run()
}
