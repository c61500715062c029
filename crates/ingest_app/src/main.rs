//! `ingest` command-line tool.
//!
//! Discovers the pages of a website from its sitemaps and turns pages and
//! local documents (PDF, DOCX, plain text, images) into normalized text ready
//! for chunking:
//!
//! - `crawl`: list the in-domain pages reachable from a sitemap or page
//! - `page`: extract one live page
//! - `file`: extract one local document
//! - `site`: crawl, extract every page and export the results to a directory

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ingest_engine::{
    export_site, extract_file, LogProgressSink, PageExtractor, SitemapCrawler, SiteIngestor,
};
use ingest_logging::{ingest_info, LogDestination};
use log::LevelFilter;

use crate::config::IngestConfig;

#[derive(Parser)]
#[command(name = "ingest", author, version, about = "Turn websites and documents into plain text for retrieval", long_about = None)]
struct Cli {
    /// RON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write the log to ./ingest.log
    #[arg(long, global = true)]
    log_file: bool,

    /// Keep the log off the terminal
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the pages of a website, starting from a sitemap or page URL
    Crawl(CrawlArgs),

    /// Extract the text of a single web page
    Page(PageArgs),

    /// Extract the text of a local PDF, DOCX, text or image file
    File(FileArgs),

    /// Crawl a website and export every page as a text document
    Site(SiteArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Sitemap or page URL to start from
    #[arg(required = true)]
    url: String,

    /// Print crawl counters to stderr
    #[arg(long)]
    stats: bool,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Page URL
    #[arg(required = true)]
    url: String,
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Document to extract
    #[arg(required = true)]
    path: PathBuf,

    /// OCR language for images, overrides the config file
    #[arg(short, long)]
    lang: Option<String>,
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Sitemap or page URL to start from
    #[arg(required = true)]
    url: String,

    /// Output directory, overrides the config file
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Some(destination) = log_destination(cli.log_file, cli.quiet) {
        ingest_logging::initialize(destination, level);
    }

    let config = IngestConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Crawl(args) => crawl(&config, args).await,
        Commands::Page(args) => page(&config, args).await,
        Commands::File(args) => file(&config, args).await,
        Commands::Site(args) => site(&config, args).await,
    }
}

/// `None` when the log goes nowhere.
fn log_destination(log_file: bool, quiet: bool) -> Option<LogDestination> {
    match (log_file, quiet) {
        (true, true) => Some(LogDestination::File),
        (true, false) => Some(LogDestination::Both),
        (false, false) => Some(LogDestination::Terminal),
        (false, true) => None,
    }
}

async fn crawl(config: &IngestConfig, args: CrawlArgs) -> anyhow::Result<()> {
    let crawler = SitemapCrawler::with_settings(config.fetch_settings());
    let report = crawler.crawl_with_stats(&args.url).await?;
    for url in &report.urls {
        println!("{url}");
    }
    if args.stats {
        eprintln!(
            "{} urls, {} fetched, {} failed, {} sitemaps, {} html pages",
            report.urls.len(),
            report.stats.fetched,
            report.stats.failed,
            report.stats.sitemaps,
            report.stats.html_pages
        );
    }
    Ok(())
}

async fn page(config: &IngestConfig, args: PageArgs) -> anyhow::Result<()> {
    let extractor = PageExtractor::with_settings(config.fetch_settings());
    let record = extractor.extract(&args.url).await?;
    println!("{}", record.data);
    Ok(())
}

async fn file(config: &IngestConfig, args: FileArgs) -> anyhow::Result<()> {
    let mut ocr = config.ocr_settings();
    if let Some(lang) = args.lang {
        ocr.language = lang;
    }
    let text = extract_file(&args.path, &ocr).await?;
    println!("{text}");
    Ok(())
}

async fn site(config: &IngestConfig, args: SiteArgs) -> anyhow::Result<()> {
    let output_dir = args.out.unwrap_or_else(|| config.output_dir.clone());
    let ingestor = SiteIngestor::with_settings(config.fetch_settings());
    let ingest = ingestor.ingest(&args.url, &LogProgressSink).await?;

    let summary = export_site(&output_dir, &args.url, &ingest)
        .with_context(|| format!("exporting to {}", output_dir.display()))?;
    ingest_info!(
        "site export finished pages={} failures={} manifest={:?}",
        summary.page_count,
        summary.failure_count,
        summary.manifest_path
    );
    println!(
        "{} pages exported, {} failed, manifest at {}",
        summary.page_count,
        summary.failure_count,
        summary.manifest_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use ingest_logging::LogDestination;

    use super::log_destination;

    #[test]
    fn quiet_log_file_writes_only_the_file() {
        assert_eq!(log_destination(true, true), Some(LogDestination::File));
        assert_eq!(log_destination(true, false), Some(LogDestination::Both));
        assert_eq!(log_destination(false, false), Some(LogDestination::Terminal));
        assert_eq!(log_destination(false, true), None);
    }
}
