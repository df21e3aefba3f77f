// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// There are two families of errors:
// - Errors that stop a whole call (bad config, bad depth, closed crawler)
// - Errors that belong to ONE url (malformed url, failed download)
//
// The second family never aborts a crawl. Those errors are stored in
// CrawlResult::errors next to the url they happened on.
//
// Rust concepts:
// - thiserror: derive macro that writes Display/Error impls for us
// - #[from]: lets the ? operator convert one error type into another
// - #[source]: keeps the underlying cause in the error chain
// =============================================================================

use thiserror::Error;

/// Invalid construction parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("argument '{name}' must be a positive number, got {value}")]
    NonPositive { name: &'static str, value: usize },
}

/// A url that cannot be resolved to a host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid URL '{url}': {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL has no host: {url}")]
    NoHost { url: String },
}

/// Everything the crawler can report
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The crawler was built with bad parameters
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// download() was called with depth 0
    #[error("crawl depth must be at least 1")]
    InvalidDepth,

    /// The crawler (or one of its pools) no longer accepts work
    #[error("crawler is closed")]
    Closed,

    /// The worker pools need a tokio runtime to start in
    #[error("no tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),

    /// Per-url: the url could not be resolved to a host
    #[error(transparent)]
    Url(#[from] UrlError),

    /// Per-url: the downloader failed
    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::NonPositive { name: "downloaders", value: 0 };
        assert_eq!(
            err.to_string(),
            "argument 'downloaders' must be a positive number, got 0"
        );
    }

    #[test]
    fn test_download_error_keeps_source() {
        use std::error::Error;

        let download = CrawlError::Download {
            url: "http://a.test/".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        };
        assert_eq!(download.to_string(), "failed to download http://a.test/: boom");
        assert!(download.source().is_some());
    }
}
