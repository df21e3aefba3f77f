// src/crawl/crawler.rs
// =============================================================================
// The crawl engine: breadth-first, depth-bounded, with a per-host cap.
//
// How one call to download(url, depth) works:
// 1. The seed goes onto the frontier with the full depth budget
// 2. The orchestrator pops links one by one and hands each to the host gate,
//    which runs it on the download pool as soon as its host has a free slot
// 3. A successful download with depth > 1 schedules an extraction task on
//    the extraction pool
// 4. Extraction pushes every link it has not seen before back onto the
//    frontier with depth - 1
// 5. When the current level runs out, the orchestrator waits on the level
//    barrier until every download and extraction of that level is done,
//    then moves on to the next (shallower) level
//
// Depth is a remaining budget: depth 1 downloads the page and stops there.
//
// Failures never stop a crawl. A bad url or a failed download is written to
// the error map; a page whose links cannot be extracted contributes nothing.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::barrier::{LevelBarrier, Party};
use super::frontier::{Frontier, PendingLink};
use super::host_gate::HostGate;
use super::pool::WorkerPool;
use super::registry::DedupRegistry;
use super::result::CrawlResult;
use crate::config::CrawlerConfig;
use crate::downloader::{host_of, Document, Downloader};
use crate::error::CrawlError;

/// A reusable crawler owning the worker pools and the host gate
pub struct Crawler {
    downloader: Arc<dyn Downloader>,
    config: CrawlerConfig,
    download_pool: Arc<WorkerPool>,
    extract_pool: Arc<WorkerPool>,
    // Shared by every download() call so the per-host cap holds across them
    gate: Arc<HostGate>,
    closed: AtomicBool,
}

impl Crawler {
    /// Validates `config` and starts both worker pools
    ///
    /// Fails with `CrawlError::Runtime` outside a tokio runtime.
    pub fn new(
        downloader: impl Downloader + 'static,
        config: CrawlerConfig,
    ) -> Result<Self, CrawlError> {
        config.validate()?;

        let download_pool = Arc::new(WorkerPool::new("download", config.downloaders)?);
        let extract_pool = Arc::new(WorkerPool::new("extract", config.extractors)?);
        let gate = Arc::new(HostGate::new(Arc::clone(&download_pool), config.per_host)?);

        tracing::debug!(?config, "crawler created");

        Ok(Self {
            downloader: Arc::new(downloader),
            config,
            download_pool,
            extract_pool,
            gate,
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Crawls from `url`, following links up to `depth - 1` hops away
    ///
    /// Per-url failures end up in the result; `Err` is only returned for
    /// `depth == 0` or when the crawler is (or gets) closed. A crawl cut
    /// short by close() never returns a partial result.
    pub async fn download(&self, url: &str, depth: usize) -> Result<CrawlResult, CrawlError> {
        if depth == 0 {
            return Err(CrawlError::InvalidDepth);
        }
        if self.is_closed() {
            return Err(CrawlError::Closed);
        }

        let crawl = Arc::new(Crawl {
            downloader: Arc::clone(&self.downloader),
            extract_pool: Arc::clone(&self.extract_pool),
            gate: Arc::clone(&self.gate),
            frontier: Frontier::new(),
            registry: DedupRegistry::new(),
            barrier: Arc::new(LevelBarrier::new(1)),
        });

        tracing::info!(url, depth, "crawl started");

        crawl.registry.mark_seen(url);
        crawl.frontier.push(PendingLink::new(url, depth));

        let mut level = depth;
        while let Some(next_depth) = crawl.frontier.front_depth() {
            if next_depth != level {
                // Everything left belongs to the next level: let the current
                // one finish so all of its links are in the frontier
                crawl.barrier.arrive_and_await_advance().await;
                level -= 1;
                tracing::info!(depth = level, queued = crawl.frontier.len(), "next level");
                continue;
            }

            let Some(link) = crawl.frontier.pop() else {
                break;
            };
            crawl.schedule(link)?;

            if crawl.frontier.is_empty() {
                crawl.barrier.arrive_and_await_advance().await;
            }
        }

        // Catches tasks that finished after the last in-loop wait
        crawl.barrier.arrive_and_await_advance().await;

        // close() drops downloads still waiting for a host slot and
        // extractions that never got scheduled
        if self.is_closed() {
            tracing::warn!(url, "crawl interrupted by close");
            return Err(CrawlError::Closed);
        }

        let (downloaded, errors) = crawl.registry.take_results();
        tracing::info!(
            url,
            downloaded = downloaded.len(),
            errors = errors.len(),
            "crawl finished"
        );

        Ok(CrawlResult { downloaded, errors })
    }

    /// Stops both pools after they drain; later downloads fail
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Downloads may still hand pages to the extractors, so they go first
        self.download_pool.shutdown().await;
        self.extract_pool.shutdown().await;
        tracing::debug!("crawler closed");
    }
}

// State of a single download() call, shared by its tasks
struct Crawl {
    downloader: Arc<dyn Downloader>,
    extract_pool: Arc<WorkerPool>,
    gate: Arc<HostGate>,
    frontier: Frontier,
    registry: DedupRegistry,
    barrier: Arc<LevelBarrier>,
}

impl Crawl {
    fn schedule(self: &Arc<Self>, link: PendingLink) -> Result<(), CrawlError> {
        let host = match host_of(&link.url) {
            Ok(host) => host,
            Err(e) => {
                tracing::warn!(url = %link.url, error = %e, "skipping malformed url");
                self.registry.record_error(&link.url, e.into());
                return Ok(());
            }
        };

        // Registered before the job exists, released when it ends or is dropped
        let party = self.barrier.party();
        let job = Box::pin(Arc::clone(self).run_download(party, link, host.clone()));
        self.gate.submit(&host, job)
    }

    async fn run_download(self: Arc<Self>, party: Party, link: PendingLink, host: String) {
        // Frees the host slot last, even if the download panics
        let _slot = HostSlot {
            crawl: Arc::clone(&self),
            host,
        };

        match self.downloader.download(&link.url).await {
            Ok(document) => {
                self.registry.record_downloaded(&link.url);
                tracing::debug!(url = %link.url, depth = link.depth, "downloaded");

                if link.depth > 1 {
                    self.schedule_extraction(document, link.depth);
                }
            }
            Err(source) => {
                tracing::warn!(url = %link.url, error = %source, "download failed");
                self.registry.record_error(
                    &link.url,
                    CrawlError::Download {
                        url: link.url.clone(),
                        source,
                    },
                );
            }
        }

        drop(party);
    }

    fn schedule_extraction(self: &Arc<Self>, document: Arc<dyn Document>, depth: usize) {
        let party = self.barrier.party();
        let crawl = Arc::clone(self);

        let job = Box::pin(crawl.run_extraction(party, document, depth - 1));

        if let Err(e) = self.extract_pool.submit(job) {
            tracing::warn!(error = %e, "extraction not scheduled");
        }
    }

    async fn run_extraction(
        self: Arc<Self>,
        party: Party,
        document: Arc<dyn Document>,
        next_depth: usize,
    ) {
        // HTML parsing is CPU work: keep it off the runtime threads that
        // drive downloads. The extraction pool still bounds how many run.
        match tokio::task::spawn_blocking(move || document.extract_links()).await {
            Ok(Ok(links)) => self.enqueue(links, next_depth),
            Ok(Err(e)) => tracing::trace!(error = %e, "link extraction failed"),
            Err(e) => tracing::error!(error = %e, "link extraction panicked"),
        }

        drop(party);
    }

    fn enqueue(&self, links: Vec<String>, next_depth: usize) {
        for link in links {
            if self.registry.mark_seen(&link) {
                self.frontier.push(PendingLink::new(link, next_depth));
            }
        }
    }
}

// Host slot held by a running download
struct HostSlot {
    crawl: Arc<Crawl>,
    host: String,
}

impl Drop for HostSlot {
    fn drop(&mut self) {
        self.crawl.gate.release(&self.host);
    }
}
