// src/config.rs
// =============================================================================
// Settings for a crawl run.
//
// FetchConfig covers a single HTTP request (timeout, User-Agent pool).
// CrawlConfig wraps it with the knobs that shape the crawl as a whole.
// The CLI builds one of these from its flags; library users can start from
// CrawlConfig::default() and override fields.
// =============================================================================

use std::time::Duration;

use crate::error::CrawlError;

/// User-Agent sent when no pool is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; Googlebot/2.1; +http://www.google.com/bot.html) Chrome/W.X.Y.Z Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_CONCURRENCY: usize = 10;

/// Whether a worklist engine may fetch the same URL more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Every discovered URL is processed, even if it was seen before.
    #[default]
    Off,
    /// Each engine skips URLs it has already claimed during this run.
    PerEngine,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout (connect + body).
    pub timeout: Duration,
    /// One of these is picked at random for every request.
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agents: vec![DEFAULT_USER_AGENT.to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Maximum number of page fetches in flight at once.
    pub concurrency: usize,
    pub fetch: FetchConfig,
    pub dedup: DedupPolicy,
    /// Keep records for pages that answered 4xx/5xx instead of skipping them.
    pub keep_error_pages: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            fetch: FetchConfig::default(),
            dedup: DedupPolicy::Off,
            keep_error_pages: false,
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.concurrency == 0 {
            return Err(CrawlError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.fetch.user_agents.is_empty() {
            return Err(CrawlError::InvalidConfig(
                "at least one User-Agent is required".to_string(),
            ));
        }
        if self.fetch.timeout.is_zero() {
            return Err(CrawlError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
