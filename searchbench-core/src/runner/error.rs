pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid target: {0}")]
    Target(#[from] searchbench_http::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("`workers` must be a positive integer")]
    InvalidWorkers,

    #[error("`queue_capacity` must be a positive integer")]
    InvalidQueueCapacity,

    #[error("`timeout` must be a positive duration")]
    InvalidTimeout,

    #[error("scenario `{0}`: `requests` must be a positive integer")]
    InvalidRequests(String),

    #[error("no scenarios configured")]
    NoScenarios,

    #[error("job queue is closed")]
    QueueClosed,

    #[error("job queue was already closed")]
    QueueAlreadyClosed,

    #[error("all workers exited while jobs were still being enqueued")]
    WorkersGone,
}

impl Error {
    /// Errors caused by the configuration handed to the runner, as opposed to failures
    /// while it was running.
    #[must_use]
    pub fn is_invalid_config(&self) -> bool {
        matches!(
            self,
            Self::Target(_)
                | Self::InvalidWorkers
                | Self::InvalidQueueCapacity
                | Self::InvalidTimeout
                | Self::InvalidRequests(_)
                | Self::NoScenarios
        )
    }
}
