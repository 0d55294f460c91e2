// src/crawl/pages.rs
// =============================================================================
// Fetches every page from the resolved list and extracts an SeoRecord from it.
//
// This is the same worklist engine as the sitemap resolver, with two
// differences:
// - a page never produces follow-up work, so every unit returns an empty list
// - fetches go through a ConcurrencyGate, so at most `concurrency` requests
//   are in flight no matter how many pages are queued
//
// Records are sent to a single collector channel rather than pushed into a
// shared Vec from many tasks.
// =============================================================================

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;

use super::gate::ConcurrencyGate;
use super::worklist::Worklist;
use crate::config::{CrawlConfig, DedupPolicy};
use crate::error::CrawlError;
use crate::extract::{Extractor, SeoRecord};
use crate::fetch::FetchClient;

pub struct PageScraper {
    client: Arc<FetchClient>,
    extractor: Arc<dyn Extractor>,
    gate: ConcurrencyGate,
    dedup: DedupPolicy,
    keep_error_pages: bool,
}

impl PageScraper {
    pub fn new(
        client: Arc<FetchClient>,
        extractor: Arc<dyn Extractor>,
        config: &CrawlConfig,
    ) -> Result<Self, CrawlError> {
        Ok(Self {
            client,
            extractor,
            gate: ConcurrencyGate::new(config.concurrency)?,
            dedup: config.dedup,
            keep_error_pages: config.keep_error_pages,
        })
    }

    /// The gate bounding this scraper's fetches.
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Scrapes every URL and returns one record per page that succeeded.
    ///
    /// Blank URLs are ignored. Failed pages are logged and left out. Record
    /// order follows completion, not input order.
    pub async fn scrape(&self, urls: Vec<String>) -> Vec<SeoRecord> {
        let urls: Vec<String> = urls.into_iter().filter(|u| !u.trim().is_empty()).collect();
        let total = urls.len();

        let (records_tx, mut records_rx) = mpsc::unbounded_channel::<SeoRecord>();
        let page = PageJob {
            client: Arc::clone(&self.client),
            extractor: Arc::clone(&self.extractor),
            gate: self.gate.clone(),
            keep_error_pages: self.keep_error_pages,
        };

        let summary = Worklist::new("pages")
            .dedup(self.dedup)
            .run(urls, move |url| {
                let page = page.clone();
                let records_tx = records_tx.clone();
                // Pages never lead anywhere else
                async move { page.run(&url, &records_tx).await.map(|()| Vec::new()) }
            })
            .await;

        let mut records = Vec::with_capacity(total);
        while let Ok(record) = records_rx.try_recv() {
            records.push(record);
        }

        info!(
            pages = total,
            scraped = records.len(),
            failed = summary.failed,
            peak_fetches = self.gate.peak(),
            "pages scraped"
        );
        records
    }
}

// Everything one page task needs, cloned into each task
#[derive(Clone)]
struct PageJob {
    client: Arc<FetchClient>,
    extractor: Arc<dyn Extractor>,
    gate: ConcurrencyGate,
    keep_error_pages: bool,
}

impl PageJob {
    async fn run(&self, url: &str, records_tx: &UnboundedSender<SeoRecord>) -> Result<(), CrawlError> {
        let document = {
            // Held for the fetch only; dropped here or on the `?` path
            let _permit = self.gate.acquire().await?;
            self.client.fetch(url).await?
        };

        if !document.is_success() && !self.keep_error_pages {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: document.status_code,
            });
        }

        let record = self
            .extractor
            .extract(&document.body, &document.url, document.status_code)?;

        // The receiver is held by scrape() until the engine drains
        let _ = records_tx.send(record);
        Ok(())
    }
}
