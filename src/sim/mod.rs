pub mod clock;
pub mod driver;
pub mod exec;
pub mod feed;
pub mod job;
pub mod report;
pub mod workload;

pub use clock::SimClock;
pub use driver::Sim;
pub use exec::SimExecutor;
pub use feed::WorkloadFeed;
pub use job::{Job, JobId};
pub use workload::{GeneratorConfig, generate_workload, load_workload, parse_workload};
