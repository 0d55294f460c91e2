// src/error.rs
// =============================================================================
// Error types for the crawl library.
//
// The binary uses anyhow (any error, with context), but the library keeps a
// small typed enum so callers and tests can tell failures apart:
// - Network:       connection failure or timeout while fetching
// - HttpStatus:    the server answered, but not with a success status
// - Parse:         a sitemap document could not be read as XML
// - InvalidUrl:    the root URL handed to the crawler is not a URL
// - InvalidConfig: settings that cannot work (e.g. zero concurrency)
// - GateClosed:    the page fetch semaphore was shut down
//
// None of these stop a crawl once it is running. The worklist engine logs
// per-page failures and keeps going; only setup errors reach the caller.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("concurrency gate closed")]
    GateClosed,
}
