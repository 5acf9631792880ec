mod cache;
mod config;
mod crawler;
mod errors;
pub mod retry;

pub use cache::{CacheKey, ScrapeCache};
pub use config::{CrawlConfig, FailurePolicy, DEFAULT_LISTING_URL};
pub use crawler::{CrawlOutcome, Crawler};
pub use errors::{PageItem, ScraperError, ScraperResult};
