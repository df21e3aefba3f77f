// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Features:
// - Breadth-first crawling from a seed url, bounded by a depth budget
// - Two worker pools: one downloads pages, one extracts their links
// - A per-host cap on concurrent downloads (admission, not delays)
// - Every url is attempted at most once per crawl
// - Failures are collected per url and never stop the crawl
//
// Submodules:
// - crawler: the Crawler type and the level-by-level orchestration
// - frontier: depth-tagged queue of links waiting to be downloaded
// - registry: concurrent dedup sets and the error map
// - barrier: the level barrier separating depths
// - host_gate: per-host admission control
// - pool: fixed-size worker pools on tokio
// - result: the CrawlResult returned to callers
// =============================================================================

mod barrier;
mod crawler;
mod frontier;
mod host_gate;
mod pool;
mod registry;
mod result;

pub use barrier::{LevelBarrier, Party};
pub use crawler::Crawler;
pub use frontier::{Frontier, PendingLink};
pub use host_gate::HostGate;
pub use pool::{Job, WorkerPool};
pub use registry::DedupRegistry;
pub use result::CrawlResult;
