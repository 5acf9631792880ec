use crate::core::CrawlConfig;
use crate::{HttpRequest, HttpResponse, ScraperError, ScraperResult, StatsTracker};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use super::Scraper;

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: None,
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone, Debug)]
enum MockRoute {
    Responses(Vec<MockResponse>),
    NetworkFailure,
}

/// In-memory site keyed by absolute URL. Unknown URLs answer 404.
///
/// A route with several responses serves them in order and then repeats the last one.
#[derive(Clone)]
pub struct MockScraper {
    routes: Arc<HashMap<String, MockRoute>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    requested: Arc<Mutex<Vec<Url>>>,
    stats: Arc<StatsTracker>,
}

impl Default for MockScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScraper {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(HashMap::new()),
            hits: Arc::new(Mutex::new(HashMap::new())),
            requested: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(StatsTracker::new()),
        }
    }

    pub fn with_page(self, url: &str, body: impl Into<String>) -> Self {
        self.with_responses(url, vec![MockResponse::ok(body)])
    }

    pub fn with_responses(mut self, url: &str, responses: Vec<MockResponse>) -> Self {
        Arc::make_mut(&mut self.routes).insert(url.to_string(), MockRoute::Responses(responses));
        self
    }

    pub fn with_network_failure(mut self, url: &str) -> Self {
        Arc::make_mut(&mut self.routes).insert(url.to_string(), MockRoute::NetworkFailure);
        self
    }

    /// Every URL fetched so far, in call order, retries included.
    pub fn requested_urls(&self) -> Vec<Url> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl Scraper for MockScraper {
    async fn fetch_single(
        &self,
        request: HttpRequest,
        _config: &CrawlConfig,
    ) -> ScraperResult<HttpResponse> {
        let key = request.url.to_string();
        self.requested.lock().push(request.url.clone());
        let index = {
            let mut hits = self.hits.lock();
            let count = hits.entry(key.clone()).or_insert(0);
            *count += 1;
            *count - 1
        };

        let response = match self.routes.get(&key) {
            Some(MockRoute::NetworkFailure) => {
                return Err(ScraperError::FetchError {
                    url: request.url,
                    reason: "connection refused".to_string(),
                })
            }
            Some(MockRoute::Responses(responses)) if !responses.is_empty() => {
                responses[index.min(responses.len() - 1)].clone()
            }
            _ => MockResponse::with_status(404, "Not Found"),
        };

        if let Some(delay) = response.delay {
            sleep(delay).await;
        }

        Ok(HttpResponse {
            url: request.url,
            status: response.status,
            headers: HashMap::new(),
            body: response.body,
            retry_count: 0,
            retry_history: HashMap::new(),
        })
    }

    fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.stats = stats;
    }
}
