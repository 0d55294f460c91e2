// src/extract/html.rs
// =============================================================================
// This module extracts SEO fields from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM, forgiving broken markup the way browsers do
// - Supports CSS selectors for finding elements
//
// What the default extractor reads:
// - the first <title>
// - the first <h1>
// - the `content` of the first <meta> whose name starts with "description"
//
// Anything missing becomes an empty string. A page without a title is still
// a page worth reporting, so it is not an error.
//
// Rust concepts:
// - Traits: Extractor is the seam where other extraction rules plug in
// - Blanket impls: any matching closure is an Extractor too
// =============================================================================

use scraper::{Html, Selector};

use super::record::SeoRecord;
use crate::error::CrawlError;

/// Converts one fetched document into an SeoRecord.
///
/// `url` is the URL that was requested and `status_code` the status the
/// server answered with; both are copied into the record unchanged.
pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, url: &str, status_code: u16) -> Result<SeoRecord, CrawlError>;
}

// Lets callers pass a plain function or closure as the extraction strategy
impl<F> Extractor for F
where
    F: Fn(&str, &str, u16) -> Result<SeoRecord, CrawlError> + Send + Sync,
{
    fn extract(&self, html: &str, url: &str, status_code: u16) -> Result<SeoRecord, CrawlError> {
        self(html, url, status_code)
    }
}

/// Title, first H1 and meta description.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl Extractor for DefaultExtractor {
    fn extract(&self, html: &str, url: &str, status_code: u16) -> Result<SeoRecord, CrawlError> {
        let document = Html::parse_document(html);

        let title = selector("title")?;
        let h1 = selector("h1")?;
        let meta = selector(r#"meta[name^="description"]"#)?;

        let meta_description = document
            .select(&meta)
            .next()
            .and_then(|element| element.value().attr("content"))
            .unwrap_or("")
            .to_string();

        Ok(SeoRecord {
            url: url.to_string(),
            title: first_text(&document, &title),
            h1: first_text(&document, &h1),
            meta_description,
            status_code,
        })
    }
}

fn selector(css: &str) -> Result<Selector, CrawlError> {
    Selector::parse(css).map_err(|e| CrawlError::Parse(format!("selector '{}': {}", css, e)))
}

// Text of the first matching element, nested text included, trimmed
fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
