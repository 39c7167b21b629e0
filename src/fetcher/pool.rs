//! Fixed-size worker pool
//!
//! Jobs are queued on a bounded multi-consumer channel. Each worker pulls one
//! job at a time and runs it to completion before taking the next, so at most
//! `size` jobs run at once. Dropping the pool closes the queue: workers finish
//! what is already queued and then exit.

use crate::config::MAX_POOL_SIZE;
use crate::SumiError;
use async_channel::{Receiver, Sender};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A unit of work run by the pool
type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Returned when submitting to a pool that has been shut down
#[derive(Debug, Error)]
#[error("worker pool is shut down")]
pub struct PoolClosed;

/// A fixed set of long-lived workers fed from a shared queue
pub struct WorkerPool {
    queue: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current Tokio runtime
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerPool)` - Workers are running and waiting for jobs
    /// * `Err(SumiError::InvalidPoolSize)` - `size` is zero or above [`MAX_POOL_SIZE`]
    /// * `Err(SumiError::NoRuntime)` - Called outside a Tokio runtime
    pub fn new(size: usize) -> Result<Self, SumiError> {
        if size == 0 || size > MAX_POOL_SIZE {
            return Err(SumiError::InvalidPoolSize(size));
        }
        let runtime = Handle::try_current().map_err(|_| SumiError::NoRuntime)?;

        let (queue, jobs) = async_channel::bounded(size);
        let workers = (0..size)
            .map(|id| {
                let worker = Worker {
                    id,
                    jobs: jobs.clone(),
                };
                runtime.spawn(worker.listen())
            })
            .collect();

        tracing::debug!("Started worker pool with {} workers", size);
        Ok(Self { queue, workers })
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues a job, waiting while the queue is full
    pub async fn submit<F>(&self, job: F) -> Result<(), PoolClosed>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.queue
            .send(Box::pin(job))
            .await
            .map_err(|_| PoolClosed)
    }

    /// Stops accepting jobs and waits for every worker to finish
    pub async fn shutdown(mut self) {
        self.queue.close();
        for worker in std::mem::take(&mut self.workers) {
            if let Err(e) = worker.await {
                tracing::error!("Worker terminated abnormally: {}", e);
            }
        }
        tracing::debug!("Worker pool shut down");
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.workers.len())
            .field("queued", &self.queue.len())
            .field("closed", &self.queue.is_closed())
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.queue.close();
    }
}

struct Worker {
    id: usize,
    jobs: Receiver<Job>,
}

impl Worker {
    async fn listen(self) {
        while let Ok(job) = self.jobs.recv().await {
            // Run on a separate task so a panicking job does not take the worker down
            if let Err(e) = tokio::spawn(job).await {
                tracing::error!("Job on worker {} failed: {}", self.id, e);
            }
        }
        tracing::trace!("Worker {} stopped", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(SumiError::InvalidPoolSize(0))
        ));
    }

    #[test]
    fn test_oversized_pool_rejected() {
        assert!(matches!(
            WorkerPool::new(MAX_POOL_SIZE + 1),
            Err(SumiError::InvalidPoolSize(n)) if n == MAX_POOL_SIZE + 1
        ));
        assert!(matches!(
            WorkerPool::new(usize::MAX),
            Err(SumiError::InvalidPoolSize(usize::MAX))
        ));
    }

    #[test]
    fn test_requires_runtime() {
        assert!(matches!(WorkerPool::new(2), Err(SumiError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_runs_all_jobs() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.size(), 3);

        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = counter.clone();
            pool.submit(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }

        pool.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_concurrency_bounded_by_size() {
        let pool = WorkerPool::new(2).unwrap();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            pool.submit(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }

        pool.shutdown().await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_panicking_job_keeps_worker_alive() {
        let pool = WorkerPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        pool.submit(async {
            panic!("job failure");
        })
        .await
        .unwrap();
        let after = counter.clone();
        pool.submit(async move {
            after.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        pool.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
