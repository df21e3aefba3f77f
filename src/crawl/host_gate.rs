// src/crawl/host_gate.rs
// =============================================================================
// Per-host admission control for downloads.
//
// Each host gets a small queue object the first time we see it:
// - in_flight: downloads of this host currently handed to the pool
// - pending: downloads waiting for a free slot, in arrival order
//
// submit() either hands the job to the download pool (a slot is free) or
// parks it. release() is called by a job when it is done: the next parked
// job of the same host takes over the slot, or the slot is freed.
//
// This bounds concurrency, not throughput: there are no delays, only a cap
// on how many downloads of one host run at the same time. Jobs never wait
// for a slot inside a worker, so a busy host cannot starve the pool.
//
// Rust concepts:
// - DashMap: a sharded concurrent map; entry().or_default() creates the
//   host queue atomically on first sight
// - one lock per host: unrelated hosts never contend
// =============================================================================

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::pool::{Job, WorkerPool};
use crate::error::{ConfigError, CrawlError};

#[derive(Default)]
struct HostQueue {
    pending: VecDeque<Job>,
    in_flight: usize,
}

pub struct HostGate {
    hosts: DashMap<String, Arc<Mutex<HostQueue>>>,
    max_per_host: usize,
    pool: Arc<WorkerPool>,
}

impl HostGate {
    pub fn new(pool: Arc<WorkerPool>, max_per_host: usize) -> Result<Self, ConfigError> {
        if max_per_host == 0 {
            return Err(ConfigError::NonPositive {
                name: "per_host",
                value: max_per_host,
            });
        }

        Ok(Self {
            hosts: DashMap::new(),
            max_per_host,
            pool,
        })
    }

    /// Runs `job` now if `host` has a free slot, otherwise queues it
    pub fn submit(&self, host: &str, job: Job) -> Result<(), CrawlError> {
        let queue = self.host_queue(host);
        let mut queue = queue.lock();

        if queue.in_flight < self.max_per_host {
            self.pool.submit(job)?;
            queue.in_flight += 1;
            tracing::debug!(host, in_flight = queue.in_flight, "download admitted");
        } else {
            queue.pending.push_back(job);
            tracing::debug!(host, pending = queue.pending.len(), "download queued");
        }

        Ok(())
    }

    /// Frees the slot held by a finished job of `host`
    pub fn release(&self, host: &str) {
        let queue = self.host_queue(host);
        let mut queue = queue.lock();

        let Some(next) = queue.pending.pop_front() else {
            queue.in_flight = queue.in_flight.saturating_sub(1);
            return;
        };

        tracing::debug!(host, pending = queue.pending.len(), "slot handed to next download");
        if self.pool.submit(next).is_err() {
            // Pool is shut down: nothing parked here can run any more.
            // Dropping the jobs releases whatever they were holding.
            let abandoned: Vec<Job> = queue.pending.drain(..).collect();
            queue.in_flight = queue.in_flight.saturating_sub(1);
            drop(queue);

            tracing::warn!(host, abandoned = abandoned.len() + 1, "download pool closed");
            drop(abandoned);
        }
    }

    /// Downloads of `host` currently running
    pub fn in_flight(&self, host: &str) -> usize {
        self.hosts
            .get(host)
            .map(|queue| queue.lock().in_flight)
            .unwrap_or(0)
    }

    /// Downloads of `host` waiting for a slot
    pub fn pending(&self, host: &str) -> usize {
        self.hosts
            .get(host)
            .map(|queue| queue.lock().pending.len())
            .unwrap_or(0)
    }

    fn host_queue(&self, host: &str) -> Arc<Mutex<HostQueue>> {
        if let Some(queue) = self.hosts.get(host) {
            return Arc::clone(queue.value());
        }
        Arc::clone(self.hosts.entry(host.to_string()).or_default().value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn test_zero_cap_rejected() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let pool = Arc::new(WorkerPool::new("download", 1).unwrap());
        assert!(HostGate::new(pool, 0).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cap_and_fifo_release() {
        let pool = Arc::new(WorkerPool::new("download", 4).unwrap());
        let gate = Arc::new(HostGate::new(Arc::clone(&pool), 1).unwrap());
        let order = Arc::new(Mutex::new(Vec::new()));

        // First job blocks until we let it go
        let (release_first, first_released) = oneshot::channel::<()>();
        {
            let gate_for_job = Arc::clone(&gate);
            let order = Arc::clone(&order);
            gate.submit(
                "a.test",
                Box::pin(async move {
                    let _ = first_released.await;
                    order.lock().push(0);
                    gate_for_job.release("a.test");
                }),
            )
            .unwrap();
        }

        for i in 1..=3 {
            let gate_for_job = Arc::clone(&gate);
            let order = Arc::clone(&order);
            gate.submit(
                "a.test",
                Box::pin(async move {
                    order.lock().push(i);
                    gate_for_job.release("a.test");
                }),
            )
            .unwrap();
        }

        assert_eq!(gate.in_flight("a.test"), 1);
        assert_eq!(gate.pending("a.test"), 3);

        release_first.send(()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
        assert_eq!(gate.in_flight("a.test"), 0);
        assert_eq!(gate.pending("a.test"), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_hosts_are_independent() {
        let pool = Arc::new(WorkerPool::new("download", 4).unwrap());
        let gate = HostGate::new(pool, 1).unwrap();

        gate.submit("a.test", Box::pin(std::future::pending())).unwrap();
        gate.submit("b.test", Box::pin(std::future::pending())).unwrap();
        gate.submit("a.test", Box::pin(async {})).unwrap();

        assert_eq!(gate.in_flight("a.test"), 1);
        assert_eq!(gate.in_flight("b.test"), 1);
        assert_eq!(gate.pending("a.test"), 1);
        assert_eq!(gate.pending("b.test"), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_cap() {
        let pool = Arc::new(WorkerPool::new("download", 8).unwrap());
        let gate = Arc::new(HostGate::new(Arc::clone(&pool), 2).unwrap());
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let gate_for_job = Arc::clone(&gate);
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let done = Arc::clone(&done);
            gate.submit(
                "busy.test",
                Box::pin(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    done.fetch_add(1, Ordering::SeqCst);
                    gate_for_job.release("busy.test");
                }),
            )
            .unwrap();
        }

        tokio::time::timeout(Duration::from_secs(5), async {
            while done.load(Ordering::SeqCst) < 20 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("jobs did not finish");

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
