// src/extract/mod.rs
// =============================================================================
// Turning fetched documents into data.
//
// Submodules:
// - html:    the Extractor strategy and the default SEO extractor
// - sitemap: reads <loc> entries out of sitemap XML
// - record:  the SeoRecord produced for every scraped page
//
// The crawl engines only see the Extractor trait, so a different set of
// extraction rules can be plugged in without touching them.
// =============================================================================

mod html;
mod record;
mod sitemap;

pub use html::{DefaultExtractor, Extractor};
pub use record::SeoRecord;
pub use sitemap::extract_locs;
