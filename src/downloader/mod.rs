// src/downloader/mod.rs
// =============================================================================
// This module defines what the crawler needs from the outside world.
//
// The crawler itself never talks HTTP or parses HTML. It only needs:
// - a Downloader that turns a url into a Document (or an I/O error)
// - a Document that can list its outbound links (or fail with an I/O error)
// - a way to find the host of a url (for the per-host download cap)
//
// Submodules:
// - http: the real Downloader, built on reqwest
// - html: link extraction from HTML pages, built on scraper
//
// Rust concepts:
// - Traits: the crawler is generic over anything implementing Downloader
// - async-trait: lets traits have async methods behind a trait object
// - Arc<dyn Trait>: shared ownership of a value whose type is only known
//   at runtime
// =============================================================================

mod html;
mod http;

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::UrlError;

pub use html::{extract_html_links, HtmlPage};
pub use http::HttpDownloader;

/// A downloaded page
pub trait Document: Send + Sync {
    /// Lists the absolute urls this page links to
    fn extract_links(&self) -> io::Result<Vec<String>>;
}

/// Fetches pages for the crawler
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> io::Result<Arc<dyn Document>>;
}

// Blanket impl so an Arc<D> can be handed to the crawler directly
#[async_trait]
impl<D: Downloader + ?Sized> Downloader for Arc<D> {
    async fn download(&self, url: &str) -> io::Result<Arc<dyn Document>> {
        (**self).download(url).await
    }
}

/// Returns the host part of a url
///
/// Example:
///   "https://example.com:8080/docs" -> "example.com"
pub fn host_of(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|source| UrlError::Malformed {
        url: url.to_string(),
        source,
    })?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(UrlError::NoHost {
            url: url.to_string(),
        }),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why are these traits and not concrete types?
//    - Tests plug in an in-memory downloader (no network needed)
//    - The CLI plugs in HttpDownloader
//    - The crawler code is the same for both
//
// 2. Why Send + Sync?
//    - The downloader is shared by many worker tasks on many threads
//    - Send: can be moved to another thread
//    - Sync: can be used from several threads at once through a reference
//
// 3. Why does download() return Arc<dyn Document>?
//    - The page is downloaded on a download worker and then read on an
//      extraction worker, so it needs an owner that can cross tasks
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_of_plain_url() {
        assert_eq!(host_of("https://example.com/page").unwrap(), "example.com");
    }

    #[test]
    fn test_host_of_ignores_port_and_path() {
        assert_eq!(host_of("http://docs.rs:8080/a/b?c=d").unwrap(), "docs.rs");
    }

    #[test]
    fn test_host_of_malformed() {
        let err = host_of("not a url").unwrap_err();
        assert!(matches!(err, UrlError::Malformed { .. }));
    }

    #[test]
    fn test_host_of_without_host() {
        let err = host_of("mailto:test@example.com").unwrap_err();
        assert!(matches!(err, UrlError::NoHost { .. }));
    }
}
