// src/fetch/client.rs
// =============================================================================
// This module performs the actual HTTP requests.
//
// Key functionality:
// - Builds one reqwest Client with the configured timeout (connection pooling
//   is shared by every task that holds the FetchClient)
// - Picks a User-Agent per request from the configured pool
// - Returns the body together with the status code; deciding whether a status
//   is acceptable is left to the caller (sitemaps and pages differ)
//
// Rust concepts:
// - Mutex: the random generator is owned by the client, so concurrent tasks
//   take turns drawing from it
// - From conversions: reqwest::Error turns into CrawlError::Network via `?`
// =============================================================================

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::{FetchConfig, DEFAULT_USER_AGENT};
use crate::error::CrawlError;

/// A fetched response body plus the bits of the response we care about.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// The URL we asked for
    pub url: String,
    /// Where we ended up after redirects
    pub final_url: String,
    pub status_code: u16,
    pub body: String,
}

impl FetchedDocument {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// True when the server sent us somewhere other than `url`.
    ///
    /// Compared after URL normalisation, so `https://x` and `https://x/`
    /// are the same place.
    pub fn redirected(&self) -> bool {
        match Url::parse(&self.url) {
            Ok(requested) => requested.as_str() != self.final_url,
            Err(_) => self.url != self.final_url,
        }
    }
}

pub struct FetchClient {
    client: Client,
    user_agents: Vec<String>,
    rng: Mutex<StdRng>,
}

impl FetchClient {
    /// Creates a client whose User-Agent choice is seeded from OS entropy.
    pub fn new(config: &FetchConfig) -> Result<Self, CrawlError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a client drawing User-Agents from the given generator.
    pub fn with_rng(config: &FetchConfig, rng: StdRng) -> Result<Self, CrawlError> {
        if config.user_agents.is_empty() {
            return Err(CrawlError::InvalidConfig(
                "at least one User-Agent is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            user_agents: config.user_agents.clone(),
            rng: Mutex::new(rng),
        })
    }

    /// Issues `GET url` and reads the whole body.
    ///
    /// Any status code is returned as a document; only transport failures
    /// (DNS, connect, timeout, broken body) become `CrawlError::Network`.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, CrawlError> {
        let user_agent = self.pick_user_agent();
        debug!(url, user_agent = %user_agent, "GET");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        let document = FetchedDocument {
            url: url.to_string(),
            final_url,
            status_code,
            body,
        };
        if document.redirected() {
            debug!(url, final_url = %document.final_url, status_code, "followed redirect");
        }

        Ok(document)
    }

    fn pick_user_agent(&self) -> String {
        // A poisoned lock only means another task panicked mid-draw; the
        // generator itself is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.user_agents
            .choose(&mut *rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }
}
