// src/extract/record.rs

use serde::{Deserialize, Serialize};

/// SEO fields pulled from one fetched page.
///
/// Built once by an Extractor and never mutated afterwards; missing tags are
/// represented by empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoRecord {
    pub url: String,
    pub title: String,
    pub h1: String,
    pub meta_description: String,
    pub status_code: u16,
}
