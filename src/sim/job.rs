use crate::core::Ticks;
use crate::error::AdmitError;
use crate::mem::MAX_BLOCK;

pub type JobId = u32;

/// One process as described by the workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub run_time: Ticks,
    pub priority: u32,
    pub mem_size: u32,
}

impl Job {
    /// Checks the job can run at all: nonzero runtime and a memory request
    /// that one block can hold.
    pub fn validate(&self) -> Result<(), AdmitError> {
        if self.run_time == 0 {
            return Err(AdmitError::ZeroRuntime { id: self.id });
        }
        if self.mem_size == 0 || self.mem_size > MAX_BLOCK {
            return Err(AdmitError::MemoryOutOfRange {
                id: self.id,
                size: self.mem_size,
            });
        }
        Ok(())
    }
}
