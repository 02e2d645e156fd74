use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

/// Mutable per-scenario counters. Only reachable through [`Stat::update`], which holds the
/// scenario's lock for the duration of the closure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatCounters {
    pub requests_total: u64,
    pub conn_errors: u64,
    pub content_errors: u64,
    /// Sum of latencies of requests that did not fail with a connection error.
    pub total_latency: Duration,
    /// Time spent enqueueing the scenario's jobs. Set once the enqueue loop is done.
    pub elapsed: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatId(usize);

impl StatId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct Stat {
    id: StatId,
    scenario: Arc<str>,
    planned: u64,
    counters: Mutex<StatCounters>,
}

impl Stat {
    #[must_use]
    pub fn id(&self) -> StatId {
        self.id
    }

    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Number of jobs the driver enqueues for this scenario.
    #[must_use]
    pub fn planned(&self) -> u64 {
        self.planned
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut StatCounters) -> R) -> R {
        let mut counters = self.counters.lock();
        f(&mut counters)
    }

    #[must_use]
    pub fn counters(&self) -> StatCounters {
        *self.counters.lock()
    }

    #[must_use]
    pub fn summary(&self) -> StatSummary {
        let c = self.counters();
        StatSummary {
            scenario: self.scenario.to_string(),
            planned: self.planned,
            requests_total: c.requests_total,
            conn_errors: c.conn_errors,
            content_errors: c.content_errors,
            total_latency: c.total_latency,
            elapsed: c.elapsed,
        }
    }
}

/// Every [`Stat`] of a run, in creation order.
#[derive(Debug, Default)]
pub struct StatBook {
    entries: RwLock<Vec<Arc<Stat>>>,
}

impl StatBook {
    pub fn create(&self, scenario: &str, planned: u64) -> Arc<Stat> {
        let mut entries = self.entries.write();
        let stat = Arc::new(Stat {
            id: StatId(entries.len()),
            scenario: Arc::from(scenario),
            planned,
            counters: Mutex::new(StatCounters::default()),
        });
        entries.push(stat.clone());
        stat
    }

    #[must_use]
    pub fn stats(&self) -> Vec<Arc<Stat>> {
        self.entries.read().clone()
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<StatSummary> {
        self.entries.read().iter().map(|s| s.summary()).collect()
    }
}

/// Read-only copy of one scenario's final counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatSummary {
    pub scenario: String,
    pub planned: u64,
    pub requests_total: u64,
    pub conn_errors: u64,
    pub content_errors: u64,
    pub total_latency: Duration,
    pub elapsed: Option<Duration>,
}

impl StatSummary {
    /// Requests that completed without a connection error.
    #[must_use]
    pub fn successful(&self) -> u64 {
        self.requests_total.saturating_sub(self.conn_errors)
    }

    /// `requests_total / elapsed`. `None` while elapsed is unknown or zero.
    #[must_use]
    pub fn rps(&self) -> Option<f64> {
        let elapsed = self.elapsed.filter(|e| !e.is_zero())?;
        Some(self.requests_total as f64 / elapsed.as_secs_f64())
    }

    /// `total_latency / requests_total`. `None` when no request succeeded, which also
    /// covers `requests_total == 0`.
    #[must_use]
    pub fn avg_latency(&self) -> Option<Duration> {
        if self.successful() == 0 {
            return None;
        }
        let nanos = self.total_latency.as_nanos() / u128::from(self.requests_total);
        Some(Duration::from_nanos(
            u64::try_from(nanos).unwrap_or(u64::MAX),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(requests_total: u64, conn_errors: u64, total_latency_ms: u64) -> StatSummary {
        StatSummary {
            scenario: "/api/v1/search".to_string(),
            planned: requests_total,
            requests_total,
            conn_errors,
            content_errors: 0,
            total_latency: Duration::from_millis(total_latency_ms),
            elapsed: Some(Duration::from_secs(2)),
        }
    }

    #[test]
    fn book_assigns_ids_in_creation_order() {
        let book = StatBook::default();
        let a = book.create("a", 1);
        let b = book.create("b", 2);

        assert_eq!(a.id().index(), 0);
        assert_eq!(b.id().index(), 1);
        let ids: Vec<_> = book.stats().iter().map(|s| s.id()).collect();
        assert_eq!(ids, [a.id(), b.id()]);
        assert_eq!(b.planned(), 2);

        let names: Vec<_> = book.summaries().into_iter().map(|s| s.scenario).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn update_is_visible_in_summary() {
        let book = StatBook::default();
        let stat = book.create("s", 3);
        stat.update(|c| {
            c.requests_total += 2;
            c.conn_errors += 1;
            c.total_latency += Duration::from_millis(5);
        });

        let s = stat.summary();
        assert_eq!(s.requests_total, 2);
        assert_eq!(s.conn_errors, 1);
        assert_eq!(s.successful(), 1);
        assert_eq!(s.total_latency, Duration::from_millis(5));
        assert_eq!(s.elapsed, None);
    }

    #[test]
    fn avg_latency_divides_by_all_requests() {
        let s = summary(4, 0, 40);
        assert_eq!(s.avg_latency(), Some(Duration::from_millis(10)));
        assert_eq!(s.rps(), Some(2.0));
    }

    #[test]
    fn avg_latency_is_undefined_without_successes() {
        assert_eq!(summary(0, 0, 0).avg_latency(), None);
        assert_eq!(summary(3, 3, 0).avg_latency(), None);
    }

    #[test]
    fn rps_is_undefined_without_elapsed() {
        let mut s = summary(10, 0, 10);
        s.elapsed = None;
        assert_eq!(s.rps(), None);
        s.elapsed = Some(Duration::ZERO);
        assert_eq!(s.rps(), None);
    }
}
