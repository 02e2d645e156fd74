use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::Uri;

use super::error::{Error, Result};
use super::handler::ResultHandler;
use super::stat::Stat;

/// One GET to execute. Consumed by exactly one worker.
#[derive(Debug, Clone)]
pub struct Job {
    /// Parsed once per scenario; clones share the underlying bytes.
    pub uri: Uri,
    pub handler: Arc<dyn ResultHandler>,
    pub stat: Arc<Stat>,
}

/// Bounded FIFO job queue split into its producing and consuming halves.
pub fn job_queue(capacity: usize) -> Result<(JobProducer, JobConsumer)> {
    if capacity == 0 {
        return Err(Error::InvalidQueueCapacity);
    }

    let (tx, rx) = mpsc::channel(capacity);
    Ok((
        JobProducer { tx: Some(tx) },
        JobConsumer {
            rx: Arc::new(Mutex::new(rx)),
        },
    ))
}

#[derive(Debug)]
pub struct JobProducer {
    tx: Option<mpsc::Sender<Job>>,
}

impl JobProducer {
    /// Waits while the queue is full.
    pub async fn enqueue(&self, job: Job) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(Error::QueueClosed)?;
        tx.send(job).await.map_err(|_| Error::WorkersGone)
    }

    /// No more jobs will be enqueued. Consumers still receive everything already queued.
    pub fn close(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => {
                drop(tx);
                Ok(())
            }
            None => Err(Error::QueueAlreadyClosed),
        }
    }
}

/// Shared by all workers; clones consume from the same queue.
#[derive(Debug, Clone)]
pub struct JobConsumer {
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl JobConsumer {
    /// Next job in submission order. Waits while the queue is empty and open; `None` once it
    /// is closed and drained.
    pub async fn dequeue(&self) -> Option<Job> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::runner::{StatAggregator, StatBook};
    use std::time::Duration;

    fn job(book: &StatBook, path: &str) -> Job {
        Job {
            uri: format!("/{path}").parse::<Uri>().unwrap(),
            handler: Arc::new(StatAggregator),
            stat: book.create(path, 1),
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(job_queue(0), Err(Error::InvalidQueueCapacity)));
    }

    #[tokio::test]
    async fn delivers_in_submission_order_and_drains_after_close() {
        let book = StatBook::default();
        let (mut producer, consumer) = job_queue(4).unwrap();

        for url in ["a", "b", "c"] {
            producer.enqueue(job(&book, url)).await.unwrap();
        }
        producer.close().unwrap();

        let mut seen = Vec::new();
        while let Some(job) = consumer.dequeue().await {
            seen.push(job.stat.scenario().to_string());
        }
        assert_eq!(seen, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn enqueue_waits_while_full() {
        let book = StatBook::default();
        let (producer, consumer) = job_queue(1).unwrap();

        producer.enqueue(job(&book, "a")).await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), producer.enqueue(job(&book, "b")))
                .await;
        assert!(blocked.is_err(), "enqueue should wait on a full queue");

        assert_eq!(consumer.dequeue().await.map(|j| j.uri.path().to_string()).as_deref(), Some("/a"));
        producer.enqueue(job(&book, "c")).await.unwrap();
        assert_eq!(consumer.dequeue().await.map(|j| j.uri.path().to_string()).as_deref(), Some("/c"));
    }

    #[tokio::test]
    async fn misuse_after_close_fails_fast() {
        let book = StatBook::default();
        let (mut producer, _consumer) = job_queue(2).unwrap();

        producer.close().unwrap();
        assert!(matches!(producer.close(), Err(Error::QueueAlreadyClosed)));
        assert!(matches!(
            producer.enqueue(job(&book, "late")).await,
            Err(Error::QueueClosed)
        ));
    }

    #[tokio::test]
    async fn enqueue_fails_when_every_consumer_is_gone() {
        let book = StatBook::default();
        let (producer, consumer) = job_queue(2).unwrap();
        drop(consumer);

        assert!(matches!(
            producer.enqueue(job(&book, "orphan")).await,
            Err(Error::WorkersGone)
        ));
    }
}
