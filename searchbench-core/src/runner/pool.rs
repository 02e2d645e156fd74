use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::HttpClient;

use super::error::{Error, Result};
use super::handler::RequestOutcome;
use super::queue::{Job, JobConsumer};

/// Fixed set of workers draining one [`JobConsumer`].
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<u64>>,
}

impl WorkerPool {
    pub fn start(
        workers: usize,
        consumer: JobConsumer,
        client: Arc<HttpClient>,
        timeout: Duration,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidWorkers);
        }

        let handles = (0..workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    consumer.clone(),
                    client.clone(),
                    timeout,
                ))
            })
            .collect();

        Ok(Self { handles })
    }

    /// Wait for every worker to exit. Workers exit once the queue is closed and drained, so
    /// close the producer first. Returns the number of jobs processed.
    pub async fn join(self) -> Result<u64> {
        let mut processed = 0u64;
        let mut first_err = None;

        for h in self.handles {
            match h.await {
                Ok(n) => processed = processed.saturating_add(n),
                Err(err) => {
                    first_err.get_or_insert(Error::Join(err));
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(processed),
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    consumer: JobConsumer,
    client: Arc<HttpClient>,
    timeout: Duration,
) -> u64 {
    let mut processed = 0u64;
    while let Some(job) = consumer.dequeue().await {
        execute(&client, &job, timeout).await;
        processed += 1;
    }

    tracing::debug!(worker_id, processed, "worker exiting");
    processed
}

async fn execute(client: &HttpClient, job: &Job, timeout: Duration) {
    let started = Instant::now();
    let res = client.get(&job.uri, timeout).await;
    let latency = started.elapsed();

    if let Err(err) = &res {
        tracing::debug!(
            uri = %job.uri,
            kind = %err.transport_error_kind(),
            error = %err,
            "request failed"
        );
    }

    job.handler.record(&RequestOutcome::new(&res, latency), &job.stat);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::ClientOptions;
    use crate::runner::{StatAggregator, StatBook, job_queue};
    use searchbench_testserver::TestServer;

    async fn drive(
        client: Arc<HttpClient>,
        path: &str,
        jobs: u64,
        workers: usize,
        capacity: usize,
    ) -> (crate::runner::StatSummary, u64) {
        let book = StatBook::default();
        let stat = book.create(path, jobs);
        let uri = client.uri_for(path).unwrap();

        let (mut producer, consumer) = job_queue(capacity).unwrap();
        let pool = WorkerPool::start(workers, consumer, client, Duration::from_secs(5)).unwrap();

        for _ in 0..jobs {
            producer
                .enqueue(Job {
                    uri: uri.clone(),
                    handler: Arc::new(StatAggregator),
                    stat: stat.clone(),
                })
                .await
                .unwrap();
        }
        producer.close().unwrap();
        let processed = pool.join().await.unwrap();

        (stat.summary(), processed)
    }

    #[tokio::test]
    async fn zero_workers_is_rejected() {
        let client = Arc::new(HttpClient::new("127.0.0.1:1", ClientOptions::default()).unwrap());
        let (_producer, consumer) = job_queue(1).unwrap();
        let res = WorkerPool::start(0, consumer, client, Duration::from_secs(1));
        assert!(matches!(res, Err(Error::InvalidWorkers)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_job_is_processed_for_any_pool_shape() {
        let server = TestServer::start().await.unwrap();
        let client = Arc::new(HttpClient::new(server.base_url(), ClientOptions::default()).unwrap());

        for (workers, capacity) in [(1, 1), (1, 8), (3, 1), (4, 2), (8, 100)] {
            let (summary, processed) =
                drive(client.clone(), "/api/v1/media_items?limit=1", 25, workers, capacity).await;
            assert_eq!(processed, 25, "workers={workers} capacity={capacity}");
            assert_eq!(summary.requests_total, 25, "workers={workers} capacity={capacity}");
            assert_eq!(summary.conn_errors, 0);
        }

        assert_eq!(server.stats().media_items_total(), 5 * 25);
        server.shutdown().await;
    }

    #[tokio::test]
    async fn refused_connections_are_counted_not_propagated() {
        // Nothing listens on port 1 locally; connects are refused immediately.
        let client = Arc::new(HttpClient::new("127.0.0.1:1", ClientOptions::default()).unwrap());

        let (summary, processed) = drive(client, "/api/v1/epg?limit=0", 6, 2, 1).await;
        assert_eq!(processed, 6);
        assert_eq!(summary.requests_total, 6);
        assert_eq!(summary.conn_errors, 6);
        assert_eq!(summary.total_latency, Duration::ZERO);
    }
}
