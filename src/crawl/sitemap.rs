// src/crawl/sitemap.rs
// =============================================================================
// Resolves a root sitemap (possibly an index of indexes) into a flat page list.
//
// How it works:
// 1. Seed a worklist engine with the root sitemap URL
// 2. For each sitemap: fetch it, read every <loc>, and classify each URL
// 3. URLs that look like sitemaps go back into the engine as follow-ups
// 4. Everything else is a page and is sent to a collector channel
// 5. Once the engine drains, the collected pages are the result
//
// There is no concurrency limit here. Every discovered sitemap is fetched as
// soon as it is found; sitemap trees are small compared to the page set.
// =============================================================================

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;

use super::worklist::Worklist;
use crate::config::DedupPolicy;
use crate::error::CrawlError;
use crate::extract::extract_locs;
use crate::fetch::FetchClient;

/// What a discovered URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Sitemap,
    Page,
}

/// Any URL containing "xml" is treated as a nested sitemap.
///
/// This is a heuristic: it never fails, but a page whose URL happens to
/// contain "xml" will be fetched as a sitemap (and yield nothing).
pub fn classify(url: &str) -> UrlKind {
    if url.contains("xml") {
        UrlKind::Sitemap
    } else {
        UrlKind::Page
    }
}

pub struct SitemapResolver {
    client: Arc<FetchClient>,
    dedup: DedupPolicy,
}

impl SitemapResolver {
    pub fn new(client: Arc<FetchClient>) -> Self {
        Self {
            client,
            dedup: DedupPolicy::Off,
        }
    }

    pub fn dedup(mut self, policy: DedupPolicy) -> Self {
        self.dedup = policy;
        self
    }

    /// Returns every page URL reachable from `root_url`.
    ///
    /// Order is not deterministic. A root that cannot be fetched or parsed
    /// is logged and gives an empty list.
    pub async fn resolve(&self, root_url: &str) -> Vec<String> {
        let (pages_tx, mut pages_rx) = mpsc::unbounded_channel::<String>();
        let client = Arc::clone(&self.client);

        Worklist::new("sitemaps")
            .dedup(self.dedup)
            .run(vec![root_url.to_string()], move |sitemap_url| {
                let client = Arc::clone(&client);
                let pages_tx = pages_tx.clone();
                async move { expand_sitemap(&client, &sitemap_url, &pages_tx).await }
            })
            .await;

        // Every unit sent its pages before reporting completion, so once the
        // engine is drained all pages are already in the channel.
        let mut pages = Vec::new();
        while let Ok(page) = pages_rx.try_recv() {
            pages.push(page);
        }

        info!(root = root_url, pages = pages.len(), "sitemap resolved");
        pages
    }
}

// Fetches one sitemap; pages go to `pages_tx`, nested sitemaps are returned
async fn expand_sitemap(
    client: &FetchClient,
    sitemap_url: &str,
    pages_tx: &UnboundedSender<String>,
) -> Result<Vec<String>, CrawlError> {
    let document = client.fetch(sitemap_url).await?;
    if !document.is_success() {
        return Err(CrawlError::HttpStatus {
            url: sitemap_url.to_string(),
            status: document.status_code,
        });
    }

    let mut nested = Vec::new();
    for loc in extract_locs(&document.body)? {
        match classify(&loc) {
            UrlKind::Sitemap => {
                info!(sitemap = %loc, parent = sitemap_url, "found sitemap");
                nested.push(loc);
            }
            UrlKind::Page => {
                // The receiver is held by resolve() until the engine drains
                let _ = pages_tx.send(loc);
            }
        }
    }

    Ok(nested)
}
