use crate::core::retry::{
    BackoffPolicy, CategoryConfig, ContentRetryCondition, RetryCategory, RetryCondition,
    RetryConfig,
};
use crate::core::CrawlConfig;
use crate::scrapers::{MockResponse, MockScraper};
use crate::{HttpRequest, Scraper, ScraperError};
use std::time::Duration;
use url::Url;

const URL: &str = "https://example.com/";

fn request() -> HttpRequest {
    HttpRequest::listing(Url::parse(URL).unwrap(), 1)
}

fn category(max_retries: usize, conditions: Vec<RetryCondition>) -> CategoryConfig {
    CategoryConfig {
        max_retries,
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(1),
        conditions,
        backoff_policy: BackoffPolicy::Constant,
    }
}

fn config_with(categories: Vec<(RetryCategory, CategoryConfig)>) -> CrawlConfig {
    let mut retry_config = RetryConfig::default();
    retry_config.categories.extend(categories);
    CrawlConfig::default().with_retry(retry_config)
}

#[tokio::test]
async fn test_rate_limit_retry() {
    let scraper = MockScraper::new().with_responses(
        URL,
        vec![
            MockResponse::with_status(429, "Rate limited"),
            MockResponse::ok("Success"),
        ],
    );
    let config = config_with(vec![(
        RetryCategory::RateLimit,
        category(3, vec![RetryCondition::StatusCode(429)]),
    )]);

    let response = scraper.fetch(request(), &config).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "Success");
    assert_eq!(response.retry_count, 1);
    assert_eq!(
        response.retry_history.get(&RetryCategory::RateLimit),
        Some(&1)
    );
}

#[tokio::test]
async fn test_bot_detection_retry() {
    let scraper = MockScraper::new().with_responses(
        URL,
        vec![
            MockResponse::ok("Bot detected, please try again"),
            MockResponse::ok("Welcome user"),
        ],
    );
    let config = config_with(vec![(
        RetryCategory::BotDetection,
        category(
            3,
            vec![RetryCondition::Content(ContentRetryCondition {
                pattern: "bot detected".to_string(),
                is_regex: false,
            })],
        ),
    )]);

    let response = scraper.fetch(request(), &config).await.unwrap();

    assert_eq!(response.body, "Welcome user");
    assert_eq!(response.retry_count, 1);
}

#[tokio::test]
async fn test_exponential_backoff() {
    let scraper = MockScraper::new().with_responses(
        URL,
        vec![
            MockResponse::with_status(429, "Rate limited"),
            MockResponse::with_status(429, "Rate limited"),
            MockResponse::ok("Success"),
        ],
    );
    let mut rate_limit = category(3, vec![RetryCondition::StatusCode(429)]);
    rate_limit.backoff_policy = BackoffPolicy::Exponential { factor: 2.0 };
    let config = config_with(vec![(RetryCategory::RateLimit, rate_limit)]);

    let start = std::time::Instant::now();
    let response = scraper.fetch(request(), &config).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(response.status, 200);
    assert_eq!(response.retry_count, 2);
    // Should wait ~300ms total (100ms + 200ms)
    assert!(elapsed >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_max_retries_exceeded() {
    let scraper =
        MockScraper::new().with_responses(URL, vec![MockResponse::with_status(429, "Rate limited")]);
    let config = config_with(vec![(
        RetryCategory::RateLimit,
        category(2, vec![RetryCondition::StatusCode(429)]),
    )]);

    let response = scraper.fetch(request(), &config).await.unwrap();

    assert_eq!(response.status, 429);
    assert_eq!(response.retry_count, 2);
    assert_eq!(scraper.requested_urls().len(), 3);
}

#[tokio::test]
async fn test_regex_content_retry() {
    let scraper = MockScraper::new().with_responses(
        URL,
        vec![
            MockResponse::ok("Your IP (1.2.3.4) has been blocked"),
            MockResponse::ok("Success"),
        ],
    );
    let config = config_with(vec![(
        RetryCategory::Custom("Blocked".to_string()),
        category(
            3,
            vec![RetryCondition::Content(ContentRetryCondition {
                pattern: r"IP.*blocked".to_string(),
                is_regex: true,
            })],
        ),
    )]);

    let response = scraper.fetch(request(), &config).await.unwrap();

    assert_eq!(response.body, "Success");
    assert_eq!(
        response
            .retry_history
            .get(&RetryCategory::Custom("Blocked".to_string())),
        Some(&1)
    );
}

#[tokio::test]
async fn test_network_failure_is_retried_then_surfaces() {
    let scraper = MockScraper::new().with_network_failure(URL);
    let config = config_with(vec![(
        RetryCategory::Network,
        category(2, vec![RetryCondition::NetworkError]),
    )]);

    let err = scraper.fetch(request(), &config).await.unwrap_err();

    assert!(matches!(err, ScraperError::FetchError { .. }));
    assert_eq!(scraper.requested_urls().len(), 3);
    assert_eq!(scraper.stats().get_stats().retry_count, 2);
}

#[tokio::test]
async fn test_no_matching_retry_condition() {
    let scraper =
        MockScraper::new().with_responses(URL, vec![MockResponse::with_status(404, "Not Found")]);

    let response = scraper
        .fetch(request(), &CrawlConfig::default())
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.retry_count, 0);
    assert!(response.retry_history.is_empty());
}

#[test]
fn test_delay_is_capped() {
    let config = CategoryConfig {
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(5),
        backoff_policy: BackoffPolicy::Exponential { factor: 2.0 },
        ..Default::default()
    };

    assert_eq!(config.calculate_delay(0), Duration::from_secs(1));
    assert_eq!(config.calculate_delay(2), Duration::from_secs(4));
    assert_eq!(config.calculate_delay(5), Duration::from_secs(5));
}

#[test]
fn test_transient_preset_covers_server_errors() {
    let config = RetryConfig::transient(3);
    assert!(!config.is_empty());
    assert!(config.categories.contains_key(&RetryCategory::ServerError));
    assert!(config.categories.contains_key(&RetryCategory::Network));
    assert!(RetryConfig::default().is_empty());
}
