pub mod core;
pub mod dataset;
pub mod export;
pub mod http;
pub mod parser;
pub mod scrapers;
pub mod stats;

pub use core::{CrawlConfig, CrawlOutcome, Crawler, PageItem, ScraperError, ScraperResult};
pub use dataset::{BookRecord, Dataset};
pub use http::{HttpRequest, HttpResponse};
pub use scrapers::{HttpScraper, Scraper};
pub use stats::StatsTracker;
