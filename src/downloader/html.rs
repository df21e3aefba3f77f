// src/downloader/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to resolve relative links against the
// url of the page they were found on.
// =============================================================================

use std::io;

use scraper::{Html, Selector};
use url::Url;

use super::Document;

/// A downloaded HTML page: its final url and its body
#[derive(Debug, Clone)]
pub struct HtmlPage {
    url: String,
    body: String,
}

impl HtmlPage {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Document for HtmlPage {
    fn extract_links(&self) -> io::Result<Vec<String>> {
        extract_html_links(&self.body, &self.url)
    }
}

/// Extracts all http(s) links from HTML content
///
/// Relative links are resolved against `base_url`. Fails only when
/// `base_url` itself cannot be parsed.
///
/// Example:
///   html = "<a href='/docs'>Docs</a>"
///   base_url = "https://example.com"
///   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, base_url: &str) -> io::Result<Vec<String>> {
    let base = Url::parse(base_url).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid base URL '{}': {}", base_url, e),
        )
    })?;

    let document = Html::parse_document(html);
    let selector = link_selector();

    let mut links = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_url(&base, href) {
                links.push(absolute_url);
            }
        }
    }

    Ok(links)
}

fn link_selector() -> Selector {
    // "a[href]" is a constant, valid selector
    Selector::parse("a[href]").unwrap()
}

// Resolves a possibly-relative href to an absolute http(s) url
//
// Examples (base = "https://example.com/page"):
//   "/docs"              -> Some("https://example.com/docs")
//   "#section"           -> None
//   "javascript:void(0)" -> None
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    // "page#a" and "page#b" are the same page
    url.set_fragment(None);
    Some(url.to_string())
}
