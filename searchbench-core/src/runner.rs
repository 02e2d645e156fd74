mod config;
mod error;
mod handler;
mod pool;
mod progress;
mod queue;
mod run;
mod stat;

pub use config::{
    BenchConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_REQUESTS, DEFAULT_TIMEOUT, DEFAULT_WORKERS,
    HandlerKind, Scenario,
};
pub use error::{Error, Result};
pub use handler::{ContentValidator, RequestOutcome, ResultHandler, StatAggregator};
pub use pool::WorkerPool;
pub use progress::{ProgressFn, ProgressUpdate};
pub use queue::{Job, JobConsumer, JobProducer, job_queue};
pub use run::{RunSummary, run_bench};
pub use stat::{Stat, StatBook, StatCounters, StatId, StatSummary};
