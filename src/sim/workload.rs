use average::Variance;
use log::info;
use rand::prelude::*;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;

use super::Job;
use crate::core::Ticks;
use crate::error::WorkloadError;
use crate::mem::MAX_BLOCK;

/// Parses a workload: one process per line as `id arrival runtime priority
/// memsize`, whitespace separated. `#` lines and blank lines are skipped.
pub fn parse_workload(text: &str) -> Result<Vec<Job>, WorkloadError> {
    let mut jobs = Vec::new();
    let mut seen = FxHashSet::default();
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields = line
            .split_whitespace()
            .map(|field| {
                field.parse::<u64>().map_err(|_| WorkloadError::Parse {
                    line: line_no,
                    reason: format!("`{field}` is not a non-negative integer"),
                })
            })
            .collect::<Result<Vec<u64>, _>>()?;

        let &[id, arrival_time, run_time, priority, mem_size] = fields.as_slice() else {
            return Err(WorkloadError::Parse {
                line: line_no,
                reason: format!("expected 5 fields, found {}", fields.len()),
            });
        };

        let narrow = |value: u64, what: &str| {
            u32::try_from(value).map_err(|_| WorkloadError::Invalid {
                line: line_no,
                reason: format!("{what} {value} out of range"),
            })
        };

        let id = narrow(id, "id")?;
        if !seen.insert(id) {
            return Err(WorkloadError::Invalid {
                line: line_no,
                reason: format!("duplicate process id {id}"),
            });
        }

        let job = Job {
            id,
            arrival_time,
            run_time,
            priority: narrow(priority, "priority")?,
            mem_size: narrow(mem_size, "memory size")?,
        };
        job.validate().map_err(|err| WorkloadError::Invalid {
            line: line_no,
            reason: err.to_string(),
        })?;
        jobs.push(job);
    }
    Ok(jobs)
}

pub fn load_workload(path: &Path) -> Result<Vec<Job>, WorkloadError> {
    let text = fs::read_to_string(path)?;
    let jobs = parse_workload(&text)?;
    log_summary(&jobs);
    Ok(jobs)
}

/// Parameters of a randomly generated workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub count: usize,
    pub seed: u64,
    pub max_gap: Ticks,
    pub max_run_time: Ticks,
    pub max_mem_size: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 20,
            seed: 0,
            max_gap: 4,
            max_run_time: 20,
            max_mem_size: MAX_BLOCK,
        }
    }
}

/// Reproducible random workload with non-decreasing arrival times.
pub fn generate_workload(config: &GeneratorConfig) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut arrival_time = 0;
    let mut jobs = Vec::with_capacity(config.count);

    for id in 1..=config.count {
        jobs.push(Job {
            id: id as u32,
            arrival_time,
            run_time: rng.random_range(1..=config.max_run_time.max(1)),
            priority: rng.random_range(0..=10),
            mem_size: rng.random_range(1..=config.max_mem_size.clamp(1, MAX_BLOCK)),
        });
        arrival_time += rng.random_range(0..=config.max_gap);
    }

    log_summary(&jobs);
    jobs
}

fn log_summary(jobs: &[Job]) {
    let run_times: Variance = jobs.iter().map(|job| job.run_time as f64).collect();
    let total: Ticks = jobs.iter().map(|job| job.run_time).sum();
    info!(
        "workload: {} processes, total runtime {total}, average {:.2}, std {:.2}",
        jobs.len(),
        run_times.mean(),
        run_times.population_variance().sqrt()
    );
}
