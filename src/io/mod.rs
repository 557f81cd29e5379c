//! Input/Output operations for temperature sweeps
//!
//! This module handles logging setup and the CSV results file.

mod output;
mod results;

pub use output::setup_output;
pub use results::write_results;
