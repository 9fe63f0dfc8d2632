use std::io;

use thiserror::Error;

use crate::core::Ticks;
use crate::mem::{Addr, MAX_BLOCK};
use crate::sim::JobId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocError {
    // Transient: the caller defers and retries on a later pass
    #[error("no free block can hold {size} units")]
    Rejected { size: u32 },

    #[error("block size {size} is not a power of two in 2..=256")]
    InvalidSize { size: u32 },

    #[error("address {addr} is not aligned to block size {size}")]
    Misaligned { addr: Addr, size: u32 },

    #[error("address {addr} lies outside the memory pool")]
    OutOfRange { addr: Addr },

    #[error("block at {addr} (size {size}) is already free")]
    DoubleFree { addr: Addr, size: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("execution handle does not refer to a live workload")]
    UnknownHandle,

    #[error("workload is not running")]
    NotRunning,

    #[error("workload is not stopped")]
    NotStopped,
}

/// A job that can never be scheduled; refused at admission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmitError {
    #[error("process {id} has zero runtime")]
    ZeroRuntime { id: JobId },

    #[error("process {id} requests {size} units, expected 1..={MAX_BLOCK}")]
    MemoryOutOfRange { id: JobId, size: u32 },
}

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("failed to read workload: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("line {line}: {reason}")]
    Invalid { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation stalled at t={now} with {pending} process(es) unable to make progress")]
    Stalled { now: Ticks, pending: usize },

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Why a ready process could not be put on the CPU during a dispatch pass.
/// Both cases are retried on a later pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("memory unavailable: {0}")]
    Memory(#[from] AllocError),

    #[error("workload control failed: {0}")]
    Control(#[from] ControlError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown argument `{0}`")]
    UnknownArgument(String),

    #[error("missing value for `{0}`")]
    MissingValue(String),

    #[error("invalid value `{value}` for `{flag}`")]
    InvalidValue { flag: String, value: String },
}
