use crate::config::{Args, Config};
use crate::io::{setup_output, write_results};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ising_sweep::analysis::{critical_temperature, per_site};
use ising_sweep::{sort_by_temperature, SweepDispatcher, SweepRequest, SweepResult};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

pub struct SweepApplication {
    args: Args,
    config: Config,
}

impl SweepApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.log_file.as_ref());
        info!("Configuration:\n{:?}", self.config);

        let request = self.config.to_request();
        let results = run_sweep(request)?;

        let output = self.config.output_path();
        write_results(&output, &results)?;
        info!("Wrote {} results to {}", results.len(), output);

        report_summary(&results, self.config.lattice_size.unwrap_or(1));
        Ok(())
    }
}

/// Run the sweep and return the results ordered by temperature.
pub fn run_sweep(request: SweepRequest) -> Result<Vec<SweepResult>> {
    let dispatcher = SweepDispatcher::new(request).wrap_err("Invalid sweep parameters")?;
    let mut results = dispatcher.run().wrap_err("Temperature sweep failed")?;
    sort_by_temperature(&mut results);
    Ok(results)
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match fs::read_to_string(&args.config_file) {
        Ok(content) => serde_yml::from_str::<Config>(&content)
            .wrap_err("Failed to parse configuration file")?,
        Err(err) if err.kind() == ErrorKind::NotFound && is_default_path(&args.config_file) => {
            Config::default()
        }
        Err(err) => {
            return Err(err).wrap_err_with(|| {
                format!("Unable to read configuration file: {}", args.config_file)
            })
        }
    };

    Ok(config.apply_args(args).with_defaults())
}

fn is_default_path(path: &str) -> bool {
    Path::new(path) == Path::new("sweep.yaml")
}

fn report_summary(results: &[SweepResult], lattice_size: usize) {
    let tc = critical_temperature();
    info!("Exact critical temperature: {:.4}", tc);
    // Last point below Tc and first point above it.
    let below = results.iter().rev().find(|r| r.temperature < tc);
    let above = results.iter().find(|r| r.temperature >= tc);
    for result in below.into_iter().chain(above) {
        let site = per_site(result, lattice_size);
        info!(
            "  T = {:.4}: M/site = {:.4}, U/site = {:.4}",
            site.temperature, site.magnetization, site.energy
        );
    }
}
