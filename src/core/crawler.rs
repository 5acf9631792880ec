use super::cache::{CacheKey, ScrapeCache};
use super::config::{CrawlConfig, FailurePolicy};
use super::errors::PageItem;
use crate::dataset::{BookRecord, Dataset};
use crate::parser::{
    build_record, parse_detail_with, parse_listing_with, CompiledRules, ListingItem,
};
use crate::stats::StatsTracker;
use crate::{HttpRequest, HttpResponse, Scraper, ScraperError, ScraperResult};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;

/// Result of a crawl, with the records gathered before a failure when the policy keeps them.
#[derive(Debug)]
pub enum CrawlOutcome {
    Complete(Dataset),
    Partial {
        dataset: Dataset,
        failed_at: PageItem,
        error: ScraperError,
    },
    Failed(ScraperError),
}

impl CrawlOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, CrawlOutcome::Complete(_))
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            CrawlOutcome::Complete(dataset) | CrawlOutcome::Partial { dataset, .. } => {
                Some(dataset)
            }
            CrawlOutcome::Failed(_) => None,
        }
    }

    /// Only a complete crawl is `Ok`.
    pub fn into_result(self) -> ScraperResult<Dataset> {
        match self {
            CrawlOutcome::Complete(dataset) => Ok(dataset),
            CrawlOutcome::Partial { error, .. } | CrawlOutcome::Failed(error) => Err(error),
        }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Filled(BookRecord),
    Skipped,
}

pub struct Crawler {
    scraper: Box<dyn Scraper>,
    config: CrawlConfig,
    stats: Arc<StatsTracker>,
}

impl Crawler {
    pub fn new(scraper: Box<dyn Scraper>) -> Self {
        info!("Initializing crawler");
        let stats = Arc::new(StatsTracker::new());
        let mut scraper = scraper;
        scraper.set_stats(Arc::clone(&stats));

        Self {
            scraper,
            config: CrawlConfig::default(),
            stats,
        }
    }

    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Crawls listing pages `1..=page_count` and every item they list.
    pub async fn scrape(&self, page_count: usize) -> ScraperResult<Dataset> {
        self.crawl(page_count).await.into_result()
    }

    pub async fn scrape_cached(
        &self,
        cache: &ScrapeCache,
        page_count: usize,
    ) -> ScraperResult<Arc<Dataset>> {
        let key = CacheKey {
            page_count,
            fingerprint: self.config.fingerprint(),
        };

        if let Some(dataset) = cache.get(&key) {
            info!(
                "Serving {} cached records for {} page(s)",
                dataset.len(),
                page_count
            );
            return Ok(dataset);
        }

        let dataset = self.scrape(page_count).await?;
        Ok(cache.insert(key, dataset))
    }

    pub async fn crawl(&self, page_count: usize) -> CrawlOutcome {
        if page_count == 0 {
            return CrawlOutcome::Failed(ScraperError::ConfigError(
                "page count must be at least 1".to_string(),
            ));
        }
        if let Err(e) = self.config.validate() {
            return CrawlOutcome::Failed(e);
        }
        let rules = match self.config.rules.compile() {
            Ok(rules) => rules,
            Err(e) => return CrawlOutcome::Failed(e),
        };
        self.stats.reset();

        info!(
            "Starting crawl of {} page(s) from {} (concurrency {})",
            page_count, self.config.listing_url_template, self.config.max_concurrency
        );

        let mut records = Vec::new();
        for page in 1..=page_count {
            if let Err(error) = self.crawl_page(page, &rules, &mut records).await {
                self.stats.finish();
                let failed_at = error.location().unwrap_or(PageItem::page(page));
                return self.fail(records, failed_at, error);
            }
        }

        self.stats.finish();
        info!(
            "Crawl finished: {} records from {} page(s)",
            records.len(),
            page_count
        );
        CrawlOutcome::Complete(records.into_iter().collect())
    }

    fn fail(&self, records: Vec<BookRecord>, failed_at: PageItem, error: ScraperError) -> CrawlOutcome {
        match self.config.failure_policy {
            FailurePolicy::Abort => {
                warn!(
                    "Crawl aborted at {}, discarding {} records: {}",
                    failed_at,
                    records.len(),
                    error
                );
                CrawlOutcome::Failed(error)
            }
            FailurePolicy::KeepPartial => {
                warn!(
                    "Crawl stopped at {}, keeping {} records: {}",
                    failed_at,
                    records.len(),
                    error
                );
                CrawlOutcome::Partial {
                    dataset: records.into_iter().collect(),
                    failed_at,
                    error,
                }
            }
        }
    }

    /// Appends the page's records in fragment order. On error, the records of every
    /// fragment before the failing one have already been appended.
    async fn crawl_page(
        &self,
        page: usize,
        rules: &CompiledRules,
        records: &mut Vec<BookRecord>,
    ) -> ScraperResult<()> {
        let location = PageItem::page(page);
        let url = self.config.listing_url(page).map_err(|e| e.at(location))?;

        info!("Fetching listing page {}: {}", page, url);
        let response = self.fetch(HttpRequest::listing(url, page)).await?;
        self.stats.record_listing_page();

        let fragments = parse_listing_with(&response.body, &response.url, rules);
        debug!("Page {} lists {} items", page, fragments.len());

        let total = fragments.len();
        let mut slots = vec![Slot::Pending; total];
        let mut pending = fragments.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut failure: Option<(usize, ScraperError)> = None;

        loop {
            while failure.is_none() && in_flight.len() < self.config.max_concurrency {
                let Some((index, fragment)) = pending.next() else {
                    break;
                };
                match fragment {
                    Ok(item) => in_flight.push(self.resolve_item(page, index, item, rules)),
                    Err(e) => match self.reject(e.at(PageItem::item(page, index + 1))) {
                        Ok(()) => slots[index] = Slot::Skipped,
                        Err(e) => failure = Some((index, e)),
                    },
                }
            }

            let Some((index, result)) = in_flight.next().await else {
                break;
            };
            match result.map_err(|e| self.reject(e)) {
                Ok(record) => slots[index] = Slot::Filled(record),
                Err(Ok(())) => slots[index] = Slot::Skipped,
                Err(Err(e)) => {
                    if failure.as_ref().map_or(true, |(failed, _)| index < *failed) {
                        failure = Some((index, e));
                    }
                }
            }
        }

        let limit = failure.as_ref().map_or(total, |(index, _)| *index);
        for slot in slots.into_iter().take(limit) {
            match slot {
                Slot::Filled(record) => {
                    self.stats.record_item();
                    records.push(record);
                }
                Slot::Skipped => {}
                Slot::Pending => break,
            }
        }

        match failure {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }

    async fn resolve_item(
        &self,
        page: usize,
        index: usize,
        item: ListingItem,
        rules: &CompiledRules,
    ) -> (usize, ScraperResult<BookRecord>) {
        let location = PageItem::item(page, index + 1);
        let result = self
            .resolve_detail(page, index + 1, item, rules)
            .await
            .map_err(|e| e.at(location));
        (index, result)
    }

    async fn resolve_detail(
        &self,
        page: usize,
        item_no: usize,
        item: ListingItem,
        rules: &CompiledRules,
    ) -> ScraperResult<BookRecord> {
        debug!("Resolving page {} item {}: {}", page, item_no, item.title);
        let response = self
            .fetch(HttpRequest::detail(item.detail_url.clone(), page, item_no))
            .await?;
        self.stats.record_detail_page();

        let detail = parse_detail_with(&response.body, rules);
        build_record(item, detail)
    }

    async fn fetch(&self, request: HttpRequest) -> ScraperResult<HttpResponse> {
        let location = request.kind.location();
        self.scraper
            .fetch(request, &self.config)
            .await
            .and_then(HttpResponse::error_for_status)
            .map_err(|e| e.at(location))
    }

    /// Lenient mode drops items with malformed markup or prices; everything else is fatal.
    fn reject(&self, error: ScraperError) -> ScraperResult<()> {
        let recoverable = matches!(
            error.root(),
            ScraperError::MalformedFragmentError(_) | ScraperError::MalformedPriceError(_)
        );

        if self.config.strict || !recoverable {
            return Err(error);
        }

        warn!("Skipping item: {}", error);
        self.stats.record_skipped_item();
        Ok(())
    }
}
