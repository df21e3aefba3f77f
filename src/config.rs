// src/config.rs
// =============================================================================
// Construction parameters of a Crawler.
//
// All three numbers must be positive. They are checked once, when the
// crawler is built, so a bad value never shows up halfway through a crawl.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sizes of the two worker pools and the per-host download cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Number of workers that download pages
    pub downloaders: usize,
    /// Number of workers that extract links from downloaded pages
    pub extractors: usize,
    /// Maximum number of concurrent downloads from one host
    pub per_host: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            downloaders: 1,
            extractors: 1,
            per_host: 1,
        }
    }
}

impl CrawlerConfig {
    pub fn new(downloaders: usize, extractors: usize, per_host: usize) -> Self {
        Self {
            downloaders,
            extractors,
            per_host,
        }
    }

    /// Rejects any zero count, naming the first offending argument
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("downloaders", self.downloaders),
            ("extractors", self.extractors),
            ("per_host", self.per_host),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}
