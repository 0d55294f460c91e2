// src/fetch/mod.rs
// =============================================================================
// The Fetch Client: one shared HTTP client used by both the sitemap resolver
// and the page scraper.
//
// - Plain GET with a fixed per-request timeout
// - User-Agent picked at random from a configured pool on every request
// - No retries; a failed request is reported once and the caller moves on
// =============================================================================

mod client;

pub use client::{FetchClient, FetchedDocument};
