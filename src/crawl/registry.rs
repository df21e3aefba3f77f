// src/crawl/registry.rs
// =============================================================================
// Dedup registry and error map for one crawl.
//
// - seen: every url ever pushed onto the frontier (seed included)
// - downloaded: every url whose download succeeded
// - errors: url -> error, written at most once per url
//
// DashSet::insert returns false when the value was already present, so
// "check and insert" is one atomic step and two pages discovering the same
// link at the same time enqueue it only once.
// =============================================================================

use std::collections::{HashMap, HashSet};

use dashmap::{DashMap, DashSet};

use crate::error::CrawlError;

#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: DashSet<String>,
    downloaded: DashSet<String>,
    errors: DashMap<String, CrawlError>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as queued; true if it was not seen before
    pub fn mark_seen(&self, url: &str) -> bool {
        // Cheap read first: most discovered links are duplicates
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string())
    }

    pub fn record_downloaded(&self, url: &str) {
        self.downloaded.insert(url.to_string());
    }

    /// Keeps the first error recorded for a url
    pub fn record_error(&self, url: &str, error: CrawlError) {
        self.errors.entry(url.to_string()).or_insert(error);
    }

    /// Moves the collected results out
    ///
    /// Only meaningful once every task of the crawl has finished; tasks
    /// may still hold a reference to the registry at that point.
    pub fn take_results(&self) -> (HashSet<String>, HashMap<String, CrawlError>) {
        let downloaded = self.downloaded.iter().map(|url| url.key().clone()).collect();

        let failed: Vec<String> = self.errors.iter().map(|e| e.key().clone()).collect();
        let errors = failed
            .into_iter()
            .filter_map(|url| self.errors.remove(&url))
            .collect();

        (downloaded, errors)
    }
}
