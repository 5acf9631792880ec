use anyhow::Context;
use bookscraper::core::retry::RetryConfig;
use bookscraper::core::{CrawlConfig, CrawlOutcome, Crawler, FailurePolicy, DEFAULT_LISTING_URL};
use bookscraper::dataset::{Filter, SortKey, SortOrder};
use bookscraper::export::{export, ExportFormat};
use bookscraper::HttpScraper;
use clap::Parser;
use log::LevelFilter;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bookscraper", about = "Scrape the books catalogue into CSV or JSON")]
struct Cli {
    /// Listing pages to crawl, starting at page 1
    #[arg(short, long, default_value_t = 1)]
    pages: usize,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// csv or json
    #[arg(short, long, default_value = "csv")]
    format: ExportFormat,

    /// Detail pages fetched at once per listing page
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,

    /// Skip items with malformed markup or prices instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Export the records gathered before a fatal error
    #[arg(long)]
    keep_partial: bool,

    /// Retries for rate limits, server errors and network failures
    #[arg(long, default_value_t = 0)]
    retries: usize,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Listing URL template containing {page}
    #[arg(long, default_value = DEFAULT_LISTING_URL)]
    base_url: String,

    /// Keep only these categories (repeatable)
    #[arg(long)]
    category: Vec<String>,

    #[arg(long, default_value_t = 0)]
    min_rating: u8,

    #[arg(long)]
    min_price: Option<f64>,

    #[arg(long)]
    max_price: Option<f64>,

    #[arg(long, default_value_t = 0)]
    min_stock: u32,

    #[arg(long)]
    in_stock: bool,

    /// Case-insensitive title search
    #[arg(long)]
    search: Option<String>,

    /// title, price, rating, category or stock
    #[arg(long)]
    sort_by: Option<SortKey>,

    #[arg(long)]
    desc: bool,

    /// Print dataset totals and per-category counts to stderr
    #[arg(long)]
    summary: bool,

    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn crawl_config(&self) -> CrawlConfig {
        let mut config = CrawlConfig::default()
            .with_listing_url(self.base_url.as_str())
            .with_concurrency(self.concurrency)
            .with_strict(!self.lenient);

        if self.keep_partial {
            config = config.with_failure_policy(FailurePolicy::KeepPartial);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if self.retries > 0 {
            config = config.with_retry(RetryConfig::transient(self.retries));
        }
        config
    }

    fn filter(&self) -> Filter {
        let mut filter = Filter::default()
            .with_min_rating(self.min_rating)
            .with_price_range(self.min_price, self.max_price)
            .with_min_stock(self.min_stock);

        if !self.category.is_empty() {
            filter = filter.with_categories(self.category.iter().cloned());
        }
        if self.in_stock {
            filter = filter.in_stock_only();
        }
        if let Some(search) = &self.search {
            filter = filter.with_title(search.as_str());
        }
        filter
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::builder()
        .filter_level(level)
        .filter_module("selectors", LevelFilter::Warn)
        .filter_module("html5ever", LevelFilter::Error)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let scraper = Box::new(HttpScraper::new()?);
    let crawler = Crawler::new(scraper).with_config(cli.crawl_config());

    let dataset = match crawler.crawl(cli.pages).await {
        CrawlOutcome::Complete(dataset) => dataset,
        CrawlOutcome::Partial {
            dataset,
            failed_at,
            error,
        } => {
            eprintln!(
                "Crawl stopped at {}: {}. Exporting {} records gathered before the failure.",
                failed_at,
                error,
                dataset.len()
            );
            dataset
        }
        CrawlOutcome::Failed(error) => {
            return Err(error).context(format!("crawl of {} page(s) failed", cli.pages));
        }
    };

    let mut view = dataset.view().filter(&cli.filter());
    if let Some(key) = cli.sort_by {
        let order = if cli.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        view = view.sort_by(key, order);
    }

    if cli.summary {
        eprintln!("{}", view.summary());
        for (category, count) in view.category_counts() {
            eprintln!("  {}: {}", category, count);
        }
    }

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            export(cli.format, &mut writer, view.iter())?;
            writer.flush()?;
            eprintln!("Wrote {} records to {}", view.len(), path.display());
            crawler.stats().print_summary();
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            export(cli.format, &mut writer, view.iter())?;
            writer.flush()?;
        }
    }

    Ok(())
}
