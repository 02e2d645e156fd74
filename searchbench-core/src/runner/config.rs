use std::sync::Arc;
use std::time::Duration;

use super::error::{Error, Result};
use super::handler::{ContentValidator, ResultHandler, StatAggregator};

pub const DEFAULT_REQUESTS: u64 = 30_000;
pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Built-in result handlers, by the name used in scenario files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum HandlerKind {
    /// Counts requests, connection errors and latency. Never flags content errors.
    #[default]
    Stats,

    /// Like `stats`, and also checks the status code and the search response envelope.
    Content,
}

impl HandlerKind {
    #[must_use]
    pub fn handler(self) -> Arc<dyn ResultHandler> {
        match self {
            Self::Stats => Arc::new(StatAggregator),
            Self::Content => Arc::new(ContentValidator),
        }
    }
}

/// One named class of load: a fixed number of GETs against one endpoint.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Label used in the report (the endpoint path without its query by default).
    pub name: String,
    /// Path and query appended to the target base URL.
    pub path: String,
    pub requests: u64,
    pub handler: Arc<dyn ResultHandler>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            requests: DEFAULT_REQUESTS,
            handler: HandlerKind::default().handler(),
        }
    }

    #[must_use]
    pub fn with_requests(mut self, requests: u64) -> Self {
        self.requests = requests;
        self
    }

    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn ResultHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// The three search API endpoints, in the order they are driven.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("/api/v1/media_items", "/api/v1/media_items?limit=1"),
            Self::new("/api/v1/search", "/api/v1/search?limit=1&query=term"),
            Self::new("/api/v1/epg", "/api/v1/epg?limit=0"),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// `host:port`, or a base URL with an explicit `http://`/`https://` scheme.
    pub target: String,
    pub workers: usize,
    pub queue_capacity: usize,
    /// Overall per-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Option<Duration>,
    pub progress_interval: Duration,
    pub scenarios: Vec<Scenario>,
}

impl BenchConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: Some(Duration::from_secs(3)),
            progress_interval: Duration::from_secs(1),
            scenarios: Scenario::defaults(),
        }
    }

    /// Reject configurations that would stall or generate no load. The target URL is
    /// checked when the client is built.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidQueueCapacity);
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidTimeout);
        }
        if self.scenarios.is_empty() {
            return Err(Error::NoScenarios);
        }
        if let Some(s) = self.scenarios.iter().find(|s| s.requests == 0) {
            return Err(Error::InvalidRequests(s.name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_search_api() {
        let cfg = BenchConfig::new("127.0.0.1:8080");
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.queue_capacity, 100);
        assert_eq!(cfg.timeout, Duration::from_secs(10));

        let names: Vec<_> = cfg.scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["/api/v1/media_items", "/api/v1/search", "/api/v1/epg"]
        );
        assert!(cfg.scenarios.iter().all(|s| s.requests == 30_000));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_stalling_configs() {
        let mut cfg = BenchConfig::new("127.0.0.1:8080");
        cfg.workers = 0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidWorkers)));

        let mut cfg = BenchConfig::new("127.0.0.1:8080");
        cfg.queue_capacity = 0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidQueueCapacity)));

        let mut cfg = BenchConfig::new("127.0.0.1:8080");
        cfg.timeout = Duration::ZERO;
        assert!(matches!(cfg.validate(), Err(Error::InvalidTimeout)));

        let mut cfg = BenchConfig::new("127.0.0.1:8080");
        cfg.scenarios.clear();
        assert!(matches!(cfg.validate(), Err(Error::NoScenarios)));

        let mut cfg = BenchConfig::new("127.0.0.1:8080");
        cfg.scenarios[1].requests = 0;
        match cfg.validate() {
            Err(Error::InvalidRequests(name)) => assert_eq!(name, "/api/v1/search"),
            other => panic!("expected InvalidRequests, got {other:?}"),
        }
    }

    #[test]
    fn handler_kind_parses_snake_case() {
        assert_eq!("stats".parse::<HandlerKind>(), Ok(HandlerKind::Stats));
        assert_eq!("content".parse::<HandlerKind>(), Ok(HandlerKind::Content));
        assert!("other".parse::<HandlerKind>().is_err());
        assert_eq!(HandlerKind::Content.to_string(), "content");
    }
}
