use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::sim::GeneratorConfig;

const USAGE: &str = "usage: srtn-sim [WORKLOAD] [--out DIR] [--count N] [--seed N] [--max-gap N] [--max-runtime N] [--max-mem N]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    // Random workload from `generator` when unset
    pub workload: Option<PathBuf>,
    pub generator: GeneratorConfig,
    pub out_dir: PathBuf,
    pub scheduler_log: String,
    pub memory_log: String,
    pub perf_file: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            workload: None,
            generator: GeneratorConfig::default(),
            out_dir: PathBuf::from("."),
            scheduler_log: "scheduler.log".into(),
            memory_log: "memory.log".into(),
            perf_file: "scheduler.perf".into(),
        }
    }
}

impl SimConfig {
    pub fn usage() -> &'static str {
        USAGE
    }

    /// Builds a config from command-line arguments, program name excluded.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| args.next().ok_or_else(|| ConfigError::MissingValue(flag.to_string()));
            match arg.as_str() {
                "--out" => config.out_dir = PathBuf::from(value("--out")?),
                "--count" => config.generator.count = parse_num("--count", value("--count")?)?,
                "--seed" => config.generator.seed = parse_num("--seed", value("--seed")?)?,
                "--max-gap" => config.generator.max_gap = parse_num("--max-gap", value("--max-gap")?)?,
                "--max-runtime" => {
                    config.generator.max_run_time = parse_num("--max-runtime", value("--max-runtime")?)?
                }
                "--max-mem" => config.generator.max_mem_size = parse_num("--max-mem", value("--max-mem")?)?,
                flag if flag.starts_with("--") => return Err(ConfigError::UnknownArgument(flag.to_string())),
                path if config.workload.is_none() => config.workload = Some(PathBuf::from(path)),
                other => return Err(ConfigError::UnknownArgument(other.to_string())),
            }
        }
        Ok(config)
    }
}

fn parse_num<T: FromStr>(flag: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value,
    })
}
