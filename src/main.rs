// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (to stderr, so stdout only carries the report)
// 2. Parse command-line arguments using clap
// 3. Build a crawler with the HTTP downloader and run one crawl
// 4. Print downloaded pages and errors
// 5. Exit with proper code (0 = no errors, 1 = some pages failed, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use host_crawler::{CrawlResult, Crawler, HttpDownloader};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr; RUST_LOG overrides the default level
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Returns:
//   Ok(0) = every page downloaded
//   Ok(1) = some pages failed
//   Err = the crawl itself could not run
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let downloader =
        HttpDownloader::with_timeout(cli.timeout()).context("failed to create HTTP client")?;
    let crawler = Crawler::new(downloader, cli.crawler_config())?;
    tracing::info!(url = %cli.url, config = ?crawler.config(), "starting crawl");

    let result = crawler.download(&cli.url, cli.depth()).await;
    crawler.close().await;
    let result = result.with_context(|| format!("crawl of {} failed", cli.url))?;

    print_results(&result, cli.json)?;

    if result.is_clean() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Prints the result either as a list or as JSON
fn print_results(result: &CrawlResult, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(result)?;
        println!("{}", json_output);
    } else {
        print_report(result);
    }
    Ok(())
}

fn print_report(result: &CrawlResult) {
    println!("Downloaded:");
    for url in result.downloaded_sorted() {
        println!(" * {}", url);
    }

    println!("{}", "-".repeat(33));

    println!("Errors:");
    for (url, error) in result.errors_sorted() {
        println!(" * {}", url);
        println!("     {}", error);
    }

    println!();
    println!("Summary:");
    println!("   Downloaded: {}", result.downloaded.len());
    println!("   Failed: {}", result.errors.len());
}
