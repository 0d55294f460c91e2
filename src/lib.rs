// src/lib.rs
// =============================================================================
// Library root: walks a sitemap index and collects SEO fields for every page.
//
//   let records = sitemap_seo::scrape_sitemap(
//       "https://example.com/sitemap.xml",
//       Arc::new(DefaultExtractor),
//       &CrawlConfig::default(),
//   ).await?;
//
// The binary in main.rs is a thin CLI over this.
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;

pub use config::{CrawlConfig, DedupPolicy, FetchConfig};
pub use crawl::{resolve_sitemap, scrape_sitemap};
pub use error::CrawlError;
pub use extract::{DefaultExtractor, Extractor, SeoRecord};
pub use fetch::FetchClient;
