// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - scrape:  resolve the sitemap, fetch every page, print the SEO fields
// - resolve: resolve the sitemap and print the page URLs only
//
// Both share the same crawl options, which are turned into a CrawlConfig
// by CrawlArgs::to_config().
// =============================================================================

use std::time::Duration;

use clap::builder::TypedValueParser;
use clap::{Args, Parser, Subcommand};

use sitemap_seo::config::{DEFAULT_CONCURRENCY, DEFAULT_USER_AGENT};
use sitemap_seo::{CrawlConfig, DedupPolicy, FetchConfig};

#[derive(Parser, Debug)]
#[command(
    name = "sitemap-seo",
    version,
    about = "Collects title, H1 and meta description for every page in a sitemap",
    long_about = "sitemap-seo follows a sitemap index down to its pages, fetches each page \
                  concurrently and reports the basic SEO fields along with the HTTP status."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logs (same as RUST_LOG=sitemap_seo=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape every page listed in a sitemap
    ///
    /// Example: sitemap-seo scrape https://example.com/sitemap.xml --concurrency 5
    Scrape {
        /// Root sitemap URL (e.g., https://example.com/sitemap.xml)
        root_url: String,

        #[command(flatten)]
        crawl: CrawlArgs,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the page URLs a sitemap resolves to, without fetching the pages
    Resolve {
        /// Root sitemap URL
        root_url: String,

        #[command(flatten)]
        crawl: CrawlArgs,

        /// Output the list as a JSON array
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Maximum number of pages fetched at the same time
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize))]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// User-Agent to send; repeat to build a pool picked from at random
    #[arg(long = "user-agent")]
    pub user_agents: Vec<String>,

    /// Skip URLs already seen during this run
    #[arg(long)]
    pub dedup: bool,

    /// Also report pages that answered with 4xx/5xx
    #[arg(long)]
    pub keep_error_pages: bool,
}

impl CrawlArgs {
    pub fn to_config(&self) -> CrawlConfig {
        let user_agents = if self.user_agents.is_empty() {
            vec![DEFAULT_USER_AGENT.to_string()]
        } else {
            self.user_agents.clone()
        };

        CrawlConfig {
            concurrency: self.concurrency,
            fetch: FetchConfig {
                timeout: Duration::from_secs(self.timeout_secs),
                user_agents,
            },
            dedup: if self.dedup {
                DedupPolicy::PerEngine
            } else {
                DedupPolicy::Off
            },
            keep_error_pages: self.keep_error_pages,
        }
    }
}
