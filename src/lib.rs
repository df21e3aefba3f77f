// src/lib.rs
// =============================================================================
// host-crawler: a concurrent web crawler with a per-host download cap.
//
// Modules:
// - crawl: the engine (Crawler, CrawlResult and the pieces behind them)
// - downloader: what the engine needs from the web, plus an HTTP version
// - config: pool sizes and the per-host cap
// - error: error types
//
// Example:
//   let crawler = Crawler::new(HttpDownloader::new()?, CrawlerConfig::new(8, 4, 2))?;
//   let result = crawler.download("https://example.com", 2).await?;
//   crawler.close().await;
// =============================================================================

pub mod config;
pub mod crawl;
pub mod downloader;
pub mod error;

pub use config::CrawlerConfig;
pub use crawl::{CrawlResult, Crawler};
pub use downloader::{host_of, Document, Downloader, HttpDownloader};
pub use error::{ConfigError, CrawlError, UrlError};
