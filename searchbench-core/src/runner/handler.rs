use std::fmt;
use std::time::Duration;

use crate::{HttpError, HttpResponse, HttpResult};

use super::stat::Stat;

/// Result of one executed job, as seen by a [`ResultHandler`].
#[derive(Debug)]
pub struct RequestOutcome<'a> {
    /// The response, or the transport/timeout error that prevented one.
    pub result: std::result::Result<&'a HttpResponse, &'a HttpError>,
    /// Wall-clock time of the HTTP call.
    pub latency: Duration,
}

impl<'a> RequestOutcome<'a> {
    pub fn new(result: &'a HttpResult<HttpResponse>, latency: Duration) -> Self {
        Self {
            result: result.as_ref(),
            latency,
        }
    }

    #[must_use]
    pub fn is_conn_error(&self) -> bool {
        self.result.is_err()
    }
}

/// Folds request outcomes into a scenario's [`Stat`].
///
/// Called from every worker concurrently. Implementations must only touch the stat through
/// [`Stat::update`] and should do any expensive work (body parsing) before taking the lock.
pub trait ResultHandler: Send + Sync + fmt::Debug {
    fn record(&self, outcome: &RequestOutcome<'_>, stat: &Stat);
}

/// Counts requests, connection errors and latency of successful requests.
///
/// Response content is never inspected, so `content_errors` stays zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatAggregator;

impl ResultHandler for StatAggregator {
    fn record(&self, outcome: &RequestOutcome<'_>, stat: &Stat) {
        stat.update(|c| {
            c.requests_total += 1;
            if outcome.is_conn_error() {
                c.conn_errors += 1;
                return;
            }
            c.total_latency += outcome.latency;
        });
    }
}

/// [`StatAggregator`] plus a content check: a response counts as a content error unless it
/// is a 2xx carrying the search API envelope `{ "total_items": <n>, "items": [...] }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentValidator;

impl ResultHandler for ContentValidator {
    fn record(&self, outcome: &RequestOutcome<'_>, stat: &Stat) {
        let content_ok = match outcome.result {
            Ok(res) => is_search_envelope(res),
            Err(_) => true,
        };

        stat.update(|c| {
            c.requests_total += 1;
            if outcome.is_conn_error() {
                c.conn_errors += 1;
                return;
            }
            c.total_latency += outcome.latency;
            if !content_ok {
                c.content_errors += 1;
            }
        });
    }
}

fn is_search_envelope(res: &HttpResponse) -> bool {
    if !res.is_success() {
        return false;
    }

    let Ok(value) = serde_json::from_slice::<serde_json::Value>(&res.body) else {
        return false;
    };

    let total = value.get("total_items").and_then(serde_json::Value::as_u64);
    let items = value.get("items").and_then(serde_json::Value::as_array);
    match (total, items) {
        (Some(total), Some(items)) => items.len() as u64 <= total,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::StatBook;
    use searchbench_http::BufferPool;

    fn response(pool: &BufferPool, status: u16, body: &[u8]) -> HttpResult<HttpResponse> {
        let mut buf = pool.acquire();
        buf.extend_from_slice(body);
        Ok(HttpResponse { status, body: buf })
    }

    fn timeout() -> HttpResult<HttpResponse> {
        Err(HttpError::Timeout(Duration::from_secs(10)))
    }

    const ENVELOPE: &[u8] = br#"{"total_items":3,"items":[{"id":1}]}"#;

    #[test]
    fn aggregator_counts_latency_for_successes_only() {
        let pool = BufferPool::new(4);
        let book = StatBook::default();
        let stat = book.create("s", 3);

        let ok = response(&pool, 200, ENVELOPE);
        StatAggregator.record(&RequestOutcome::new(&ok, Duration::from_millis(7)), &stat);
        let err = timeout();
        StatAggregator.record(&RequestOutcome::new(&err, Duration::from_secs(10)), &stat);
        let bad = response(&pool, 500, b"nope");
        StatAggregator.record(&RequestOutcome::new(&bad, Duration::from_millis(3)), &stat);

        let c = stat.counters();
        assert_eq!(c.requests_total, 3);
        assert_eq!(c.conn_errors, 1);
        assert_eq!(c.content_errors, 0);
        assert_eq!(c.total_latency, Duration::from_millis(10));
    }

    #[test]
    fn validator_flags_bad_status_and_bodies() {
        let pool = BufferPool::new(4);
        let book = StatBook::default();
        let stat = book.create("s", 5);

        let cases = [
            response(&pool, 200, ENVELOPE),
            response(&pool, 500, ENVELOPE),
            response(&pool, 200, b"<html>oops</html>"),
            response(&pool, 200, br#"{"items":[]}"#),
            response(&pool, 200, br#"{"total_items":0,"items":[{"id":1}]}"#),
        ];
        for res in &cases {
            ContentValidator.record(&RequestOutcome::new(res, Duration::from_millis(1)), &stat);
        }

        let c = stat.counters();
        assert_eq!(c.requests_total, 5);
        assert_eq!(c.conn_errors, 0);
        assert_eq!(c.content_errors, 4);
        assert_eq!(c.total_latency, Duration::from_millis(5));
    }

    #[test]
    fn validator_does_not_count_content_for_conn_errors() {
        let book = StatBook::default();
        let stat = book.create("s", 1);

        let err = timeout();
        ContentValidator.record(&RequestOutcome::new(&err, Duration::from_secs(10)), &stat);

        let c = stat.counters();
        assert_eq!(c.requests_total, 1);
        assert_eq!(c.conn_errors, 1);
        assert_eq!(c.content_errors, 0);
        assert_eq!(c.total_latency, Duration::ZERO);
    }
}
