use env_logger::Env;
use log::error;
use srtn_sim::{
    Sim, SimConfig,
    error::{ConfigError, SimError, WorkloadError},
    sim::{generate_workload, load_workload, report},
};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Workload(#[from] WorkloadError),
    #[error(transparent)]
    Sim(#[from] SimError),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            if matches!(err, RunError::Config(_)) {
                eprintln!("{}", SimConfig::usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), RunError> {
    let config = SimConfig::from_args(std::env::args().skip(1))?;
    let jobs = match &config.workload {
        Some(path) => load_workload(path)?,
        None => generate_workload(&config.generator),
    };

    let result = Sim::new(jobs).run()?;
    report::write_reports(&result, &config)?;
    report::print_summary(&result.stats, config.workload.as_deref());
    Ok(())
}
