use std::sync::Arc;
use std::time::Duration;

use super::stat::StatId;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Monotonic tick counter (1-based) for progress emissions.
    pub tick: u64,
    /// Time since the run started.
    pub elapsed: Duration,
    /// Identifies the scenario; names are labels and need not be unique.
    pub stat_id: StatId,
    pub scenario: String,
    /// Jobs the driver enqueues for this scenario.
    pub planned: u64,
    /// Whether the driver has finished enqueueing this scenario.
    pub enqueued: bool,
    /// Requests completed so far.
    pub requests_total: u64,
    pub conn_errors: u64,
    pub content_errors: u64,
    /// Requests/sec completed during the last progress interval.
    pub rps_now: f64,
}

pub type ProgressFn = Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;
