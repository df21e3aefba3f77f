// src/crawl/result.rs
// =============================================================================
// The outcome of one crawl: which urls downloaded and which failed (and why).
//
// It is built once, at the very end of Crawler::download, and never changes
// afterwards. A url is either in `downloaded` or in `errors`, never both.
// =============================================================================

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::ser::{Serialize, Serializer};

use crate::error::CrawlError;

#[derive(Debug, Default)]
pub struct CrawlResult {
    pub downloaded: HashSet<String>,
    pub errors: HashMap<String, CrawlError>,
}

impl CrawlResult {
    /// Downloaded urls in alphabetical order (for stable output)
    pub fn downloaded_sorted(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.downloaded.iter().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    /// Failed urls and their errors, in alphabetical order
    pub fn errors_sorted(&self) -> Vec<(&str, &CrawlError)> {
        let mut errors: Vec<(&str, &CrawlError)> =
            self.errors.iter().map(|(url, e)| (url.as_str(), e)).collect();
        errors.sort_unstable_by(|a, b| a.0.cmp(b.0));
        errors
    }

    /// True when no url failed
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// Errors are not serializable themselves, so the JSON form carries their
// messages instead:
//   {"downloaded": ["..."], "errors": {"url": "message"}}
impl Serialize for CrawlResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Report<'a> {
            downloaded: Vec<&'a str>,
            errors: BTreeMap<&'a str, String>,
        }

        Report {
            downloaded: self.downloaded_sorted(),
            errors: self
                .errors
                .iter()
                .map(|(url, e)| (url.as_str(), e.to_string()))
                .collect(),
        }
        .serialize(serializer)
    }
}
