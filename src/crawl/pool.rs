// src/crawl/pool.rs
// =============================================================================
// A fixed-size pool of tokio worker tasks.
//
// The crawler owns two of these: one runs downloads, one runs link
// extraction. Jobs go into an unbounded channel; `size` workers take turns
// pulling the next job and running it to completion. Submitting never
// waits.
//
// Shutdown closes the channel. Workers keep draining what is already
// queued, then exit; new submissions fail with CrawlError::Closed.
// =============================================================================

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::CrawlError;

/// A unit of work for a pool
pub type Job = BoxFuture<'static, ()>;

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>>;

#[derive(Debug)]
pub struct WorkerPool {
    name: &'static str,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current tokio runtime
    pub fn new(name: &'static str, size: usize) -> Result<Self, CrawlError> {
        let runtime = Handle::try_current()?;

        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver: SharedReceiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| runtime.spawn(run_worker(name, id, Arc::clone(&receiver))))
            .collect();

        tracing::debug!(pool = name, size, "worker pool started");

        Ok(Self {
            name,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        })
    }

    pub fn submit(&self, job: Job) -> Result<(), CrawlError> {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => sender.send(job).map_err(|_| CrawlError::Closed),
            None => Err(CrawlError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Stops accepting jobs and waits for the workers to drain the queue
    pub async fn shutdown(&self) {
        // Dropping the last sender closes the channel
        drop(self.sender.lock().take());

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(pool = self.name, error = %e, "worker task failed");
            }
        }

        tracing::debug!(pool = self.name, "worker pool stopped");
    }
}

async fn run_worker(name: &'static str, id: usize, receiver: SharedReceiver) {
    loop {
        // The receiver lock is released before the job runs
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        // A panicking job must not take the worker down with it
        if AssertUnwindSafe(job).catch_unwind().await.is_err() {
            tracing::error!(pool = name, worker = id, "job panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_runs_every_job() {
        let pool = WorkerPool::new("test", 3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.submit(Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        }

        pool.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_size_bounds_parallelism() {
        let pool = WorkerPool::new("test", 2).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.submit(Box::pin(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }))
            .unwrap();
        }

        pool.shutdown().await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_needs_a_runtime() {
        let result = WorkerPool::new("test", 1);
        assert!(matches!(result, Err(CrawlError::Runtime(_))));
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_fails() {
        let pool = WorkerPool::new("test", 1).unwrap();
        pool.shutdown().await;

        assert!(pool.is_closed());
        let result = pool.submit(Box::pin(async {}));
        assert!(matches!(result, Err(CrawlError::Closed)));
    }

    #[tokio::test]
    async fn test_worker_survives_panicking_job() {
        let pool = WorkerPool::new("test", 1).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        pool.submit(Box::pin(async { panic!("bad job") })).unwrap();
        let flag = Arc::clone(&done);
        pool.submit(Box::pin(async move {
            flag.store(1, Ordering::SeqCst);
        }))
        .unwrap();

        pool.shutdown().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
