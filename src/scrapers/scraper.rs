use crate::core::retry::{Attempt, RetryState};
use crate::core::CrawlConfig;
use crate::{HttpRequest, HttpResponse, ScraperResult, StatsTracker};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, trace, warn};
use std::sync::Arc;
use tokio::time::sleep;

#[async_trait]
pub trait Scraper: Send + Sync {
    async fn fetch_single(
        &self,
        request: HttpRequest,
        config: &CrawlConfig,
    ) -> ScraperResult<HttpResponse>;
    fn stats(&self) -> &StatsTracker;
    fn set_stats(&mut self, stats: Arc<StatsTracker>);

    async fn fetch(&self, request: HttpRequest, config: &CrawlConfig) -> ScraperResult<HttpResponse> {
        let start_time = Utc::now();
        let mut state = RetryState::new();

        loop {
            debug!("Fetching URL: {}", request.url);
            let attempt = self.fetch_single(request.clone(), config).await;

            let retry = match &attempt {
                Ok(response) => config.retry_config.should_retry(
                    &mut state,
                    Attempt::Response {
                        status: response.status,
                        body: &response.body,
                    },
                ),
                Err(e) if e.is_network() => {
                    self.stats().record_network_error();
                    config
                        .retry_config
                        .should_retry(&mut state, Attempt::NetworkFailure)
                }
                Err(_) => None,
            };

            if let Some((category, delay)) = retry {
                self.stats().record_retry(format!("{:?}", category));
                let attempt_no = state.counts.get(&category).copied().unwrap_or(0);

                warn!(
                    "Retry triggered for URL: {} (category={:?}, attempt={}/{}, delay={:?})",
                    request.url,
                    category,
                    attempt_no,
                    config
                        .retry_config
                        .categories
                        .get(&category)
                        .map(|c| c.max_retries)
                        .unwrap_or(0),
                    delay
                );

                sleep(delay).await;
                continue;
            }

            let response = attempt?;
            debug!(
                "Request completed for URL: {} (total_retries={}, status={}, body_length={})",
                request.url,
                state.total_retries,
                response.status,
                response.body.len()
            );
            trace!("Retry history for {}: {:?}", request.url, state.counts);

            let duration = Utc::now().signed_duration_since(start_time);
            self.stats()
                .record_request(response.status, response.body.len(), duration);

            return Ok(HttpResponse {
                retry_count: state.total_retries,
                retry_history: state.counts,
                ..response
            });
        }
    }
}
