// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   host-crawler <url> [depth [downloaders [extractors [per_host]]]] [--json]
//
// Every number is optional, defaults to 1 and must be at least 1.
// clap rejects a zero before the crawler is ever built.
// =============================================================================

use std::time::Duration;

use clap::Parser;

use host_crawler::CrawlerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "host-crawler",
    version,
    about = "Crawl a website breadth-first with a per-host download cap",
    long_about = "host-crawler downloads pages starting from a url, follows their links up to a \
                  given depth and never runs more than a fixed number of downloads against \
                  one host at a time. It prints the pages it downloaded and the ones that failed."
)]
pub struct Cli {
    /// Url to start crawling from (e.g., https://example.com)
    pub url: String,

    /// Crawl depth: 1 = just the starting page, 2 = plus the pages it links to, etc.
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub depth: u64,

    /// Number of concurrent download workers
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub downloaders: u64,

    /// Number of concurrent link extraction workers
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub extractors: u64,

    /// Maximum number of concurrent downloads from one host
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub per_host: u64,

    /// Output results in JSON format instead of a list
    #[arg(long)]
    pub json: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig::new(
            self.downloaders as usize,
            self.extractors as usize,
            self.per_host as usize,
        )
    }

    pub fn depth(&self) -> usize {
        self.depth as usize
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
