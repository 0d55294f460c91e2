// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Two stages, each a worklist engine (see worklist.rs):
// - sitemap: root sitemap -> nested sitemaps -> flat list of page URLs
// - pages:   page URLs -> fetched under a concurrency limit -> SeoRecords
//
// The stages share one FetchClient. scrape_sitemap() chains them and is the
// entry point the CLI uses.
//
// Rust concepts:
// - Arc<dyn Trait>: the extractor is chosen at runtime and shared by tasks
// - Result + ?: setup errors (bad URL, bad config) stop the crawl before it
//   starts; errors during the crawl are handled per page
// =============================================================================

mod gate;
mod pages;
mod sitemap;
mod worklist;

pub use gate::{ConcurrencyGate, GatePermit};
pub use pages::PageScraper;
pub use sitemap::{classify, SitemapResolver, UrlKind};
pub use worklist::{Worklist, WorklistSummary};

use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::extract::{Extractor, SeoRecord};
use crate::fetch::FetchClient;

/// Resolves `root_url` into pages and scrapes every one of them.
///
/// Fails only if the URL or the configuration is unusable. An unreachable
/// root sitemap gives `Ok` with no records (and a logged warning).
pub async fn scrape_sitemap(
    root_url: &str,
    extractor: Arc<dyn Extractor>,
    config: &CrawlConfig,
) -> Result<Vec<SeoRecord>, CrawlError> {
    config.validate()?;
    let client = Arc::new(FetchClient::new(&config.fetch)?);

    let pages = resolve_with(&client, root_url, config).await?;
    info!(pages = pages.len(), concurrency = config.concurrency, "scraping pages");

    let scraper = PageScraper::new(client, extractor, config)?;
    Ok(scraper.scrape(pages).await)
}

/// Runs only the sitemap stage and returns the page URLs it found.
pub async fn resolve_sitemap(root_url: &str, config: &CrawlConfig) -> Result<Vec<String>, CrawlError> {
    config.validate()?;
    let client = Arc::new(FetchClient::new(&config.fetch)?);
    resolve_with(&client, root_url, config).await
}

async fn resolve_with(
    client: &Arc<FetchClient>,
    root_url: &str,
    config: &CrawlConfig,
) -> Result<Vec<String>, CrawlError> {
    check_root_url(root_url)?;
    let resolver = SitemapResolver::new(Arc::clone(client)).dedup(config.dedup);
    Ok(resolver.resolve(root_url).await)
}

fn check_root_url(root_url: &str) -> Result<(), CrawlError> {
    let parsed = Url::parse(root_url).map_err(|e| CrawlError::InvalidUrl {
        url: root_url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CrawlError::InvalidUrl {
            url: root_url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
