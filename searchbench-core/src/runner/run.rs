use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{ClientOptions, HttpClient, Uri};

use super::config::{BenchConfig, Scenario};
use super::error::Result;
use super::pool::WorkerPool;
use super::progress::{ProgressFn, ProgressUpdate};
use super::queue::{Job, JobProducer, job_queue};
use super::stat::{Stat, StatBook, StatSummary};

#[derive(Debug, Clone)]
pub struct RunSummary {
    /// One entry per scenario, in the order the scenarios were driven.
    pub scenarios: Vec<StatSummary>,
    /// Wall time from the first enqueue until every worker exited.
    pub elapsed: Duration,
}

/// Drive every scenario of `cfg` through a fresh worker pool and return the final stats.
///
/// The queue is closed and all workers are joined before this returns, so every enqueued
/// job is reflected in the summaries. Request failures never fail the run; only invalid
/// configuration or queue misuse does.
pub async fn run_bench(cfg: BenchConfig, progress: Option<ProgressFn>) -> Result<RunSummary> {
    cfg.validate()?;

    let client = Arc::new(HttpClient::new(
        &cfg.target,
        ClientOptions {
            connect_timeout: cfg.connect_timeout,
            ..ClientOptions::default()
        },
    )?);

    let scenarios = cfg
        .scenarios
        .iter()
        .map(|s| -> Result<(&Scenario, Uri)> { Ok((s, client.uri_for(&s.path)?)) })
        .collect::<Result<Vec<_>>>()?;

    let (mut producer, consumer) = job_queue(cfg.queue_capacity)?;
    let pool = WorkerPool::start(cfg.workers, consumer, client.clone(), cfg.timeout)?;
    let book = Arc::new(StatBook::default());

    tracing::info!(
        target_url = %client.base_url(),
        workers = cfg.workers,
        queue_capacity = cfg.queue_capacity,
        timeout = ?cfg.timeout,
        scenarios = cfg.scenarios.len(),
        "start"
    );

    let started = Instant::now();
    let progress_handle = progress
        .map(|progress| spawn_progress(progress, book.clone(), started, cfg.progress_interval));

    let driven = drive_scenarios(&producer, &book, &scenarios).await;
    if driven.is_ok() {
        tracing::debug!(elapsed = ?started.elapsed(), "finish enqueueing");
    }

    // Tear down even if driving failed so no worker is left behind.
    let closed = producer.close();
    let joined = pool.join().await;
    let elapsed = started.elapsed();

    if let Some(h) = progress_handle {
        h.abort();
        let _ = h.await;
    }

    driven?;
    closed?;
    let processed = joined?;
    tracing::debug!(processed, elapsed = ?elapsed, "workers joined");

    Ok(RunSummary {
        scenarios: book.summaries(),
        elapsed,
    })
}

async fn drive_scenarios(
    producer: &JobProducer,
    book: &StatBook,
    scenarios: &[(&Scenario, Uri)],
) -> Result<()> {
    for (scenario, uri) in scenarios {
        run_scenario(producer, book, scenario, uri).await?;
    }
    Ok(())
}

/// Enqueue one scenario's jobs. The recorded elapsed time covers the enqueue loop only;
/// requests still in the queue or in flight complete after this returns.
async fn run_scenario(
    producer: &JobProducer,
    book: &StatBook,
    scenario: &Scenario,
    uri: &Uri,
) -> Result<Arc<Stat>> {
    let stat = book.create(&scenario.name, scenario.requests);

    tracing::debug!(
        scenario = %scenario.name,
        uri = %uri,
        requests = scenario.requests,
        "scenario started"
    );

    let started = Instant::now();
    for _ in 0..scenario.requests {
        producer
            .enqueue(Job {
                uri: uri.clone(),
                handler: scenario.handler.clone(),
                stat: stat.clone(),
            })
            .await?;
    }
    let elapsed = stat.update(|c| *c.elapsed.insert(started.elapsed()));

    tracing::debug!(scenario = %scenario.name, elapsed = ?elapsed, "scenario enqueued");
    Ok(stat)
}

fn spawn_progress(
    progress: ProgressFn,
    book: Arc<StatBook>,
    started: Instant,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tick_id: u64 = 0;
        let mut last_at = Instant::now();
        // Indexed by StatId.
        let mut last_totals: Vec<u64> = Vec::new();

        loop {
            interval.tick().await;

            tick_id = tick_id.saturating_add(1);
            let now = Instant::now();
            let dt = now.duration_since(last_at).as_secs_f64().max(1e-9);
            last_at = now;

            for stat in book.stats() {
                let idx = stat.id().index();
                if last_totals.len() <= idx {
                    last_totals.resize(idx + 1, 0);
                }

                let c = stat.counters();
                let delta = c.requests_total.saturating_sub(last_totals[idx]);
                last_totals[idx] = c.requests_total;

                (progress)(ProgressUpdate {
                    tick: tick_id,
                    elapsed: started.elapsed(),
                    stat_id: stat.id(),
                    scenario: stat.scenario().to_string(),
                    planned: stat.planned(),
                    enqueued: c.elapsed.is_some(),
                    requests_total: c.requests_total,
                    conn_errors: c.conn_errors,
                    content_errors: c.content_errors,
                    rps_now: (delta as f64) / dt,
                });
            }
        }
    })
}
