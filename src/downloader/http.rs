// src/downloader/http.rs
// =============================================================================
// The real Downloader: fetches pages over HTTP(S) with reqwest.
//
// Key functionality:
// - One shared Client for every request (connection pooling)
// - Request timeout and a bounded number of redirects
// - Any failure (transport error or non-2xx status) becomes an io::Error,
//   which is what the crawler records against the url
// =============================================================================

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{Document, Downloader, HtmlPage};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 5;

/// Downloads HTML pages with a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> io::Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> io::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("host-crawler/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> io::Result<Arc<dyn Document>> {
        tracing::trace!(url, "fetching page");

        let response = self.client.get(url).send().await.map_err(to_io_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        // Links are resolved against the url we ended up on after redirects
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(to_io_error)?;

        let page = HtmlPage::new(final_url, body);
        if page.url() != url {
            tracing::debug!(url, final_url = page.url(), "followed redirect");
        }

        Ok(Arc::new(page))
    }
}

// Maps reqwest errors onto io::ErrorKind
fn to_io_error(error: reqwest::Error) -> io::Error {
    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else if error.is_connect() {
        io::ErrorKind::ConnectionRefused
    } else {
        io::ErrorKind::Other
    };

    io::Error::new(kind, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(HttpDownloader::with_timeout(Duration::from_millis(500)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_io_error() {
        // Port 9 on localhost is the discard port; nothing listens there in CI
        let downloader = HttpDownloader::with_timeout(Duration::from_secs(2)).unwrap();
        let result = downloader.download("http://127.0.0.1:9/").await;
        assert!(result.is_err());
    }
}
