// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the results as a table or JSON
// 5. Exit with proper code (0 = records found, 1 = nothing scraped, 2 = error)
// =============================================================================

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use sitemap_seo::{resolve_sitemap, scrape_sitemap, DefaultExtractor, SeoRecord};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise info, or debug for our crate with --verbose
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "info,sitemap_seo=debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Scrape { root_url, crawl, json } => {
            let config = crawl.to_config();
            let records = scrape_sitemap(&root_url, Arc::new(DefaultExtractor), &config)
                .await
                .with_context(|| format!("failed to scrape {}", root_url))?;

            print_records(&records, json)?;

            if records.is_empty() {
                Ok(1)
            } else {
                Ok(0)
            }
        }
        Commands::Resolve { root_url, crawl, json } => {
            let pages = resolve_sitemap(&root_url, &crawl.to_config())
                .await
                .with_context(|| format!("failed to resolve {}", root_url))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            } else {
                for page in &pages {
                    println!("{}", page);
                }
                eprintln!("{} page(s)", pages.len());
            }

            if pages.is_empty() {
                Ok(1)
            } else {
                Ok(0)
            }
        }
    }
}

fn print_records(records: &[SeoRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        print_table(records);
    }
    Ok(())
}

fn print_table(records: &[SeoRecord]) {
    println!("{:<60} {:<8} {:<40}", "URL", "STATUS", "TITLE");
    println!("{}", "=".repeat(108));

    for record in records {
        println!(
            "{:<60} {:<8} {:<40}",
            truncate(&record.url, 57),
            record.status_code,
            truncate(&record.title, 37)
        );
    }

    println!();

    let missing_title = records.iter().filter(|r| r.title.is_empty()).count();
    let missing_h1 = records.iter().filter(|r| r.h1.is_empty()).count();
    let missing_description = records.iter().filter(|r| r.meta_description.is_empty()).count();

    println!("Summary:");
    println!("   Pages:                    {}", records.len());
    println!("   Missing title:            {}", missing_title);
    println!("   Missing H1:               {}", missing_h1);
    println!("   Missing meta description: {}", missing_description);
}

// Cuts on a char boundary so multi-byte titles don't panic
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
