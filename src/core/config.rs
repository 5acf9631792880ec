use super::retry::RetryConfig;
use crate::parser::ExtractionRules;
use crate::{ScraperError, ScraperResult};
use std::time::Duration;
use url::Url;

pub const DEFAULT_LISTING_URL: &str = "http://books.toscrape.com/catalogue/page-{page}.html";
const PAGE_PLACEHOLDER: &str = "{page}";

/// What the crawler does with the records collected before an unrecoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Discard everything and report the error.
    #[default]
    Abort,
    /// Hand back the records completed before the failure, tagged as partial.
    KeepPartial,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub listing_url_template: String,
    pub headers: Vec<(String, String)>,
    pub max_concurrency: usize,
    /// Malformed fragments and prices abort the crawl when set, otherwise the item is skipped.
    pub strict: bool,
    pub failure_policy: FailurePolicy,
    pub timeout: Option<Duration>,
    pub retry_config: RetryConfig,
    pub rules: ExtractionRules,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            listing_url_template: DEFAULT_LISTING_URL.to_string(),
            headers: Vec::new(),
            max_concurrency: 1,
            strict: true,
            failure_policy: FailurePolicy::Abort,
            timeout: None,
            retry_config: RetryConfig::default(),
            rules: ExtractionRules::default(),
        }
    }
}

impl CrawlConfig {
    pub fn with_listing_url(mut self, template: impl Into<String>) -> Self {
        self.listing_url_template = template.into();
        self
    }

    pub fn with_headers(mut self, headers: Vec<(&str, &str)>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn with_rules(mut self, rules: ExtractionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn validate(&self) -> ScraperResult<()> {
        if !self.listing_url_template.contains(PAGE_PLACEHOLDER) {
            return Err(ScraperError::ConfigError(format!(
                "listing url template {:?} has no {} placeholder",
                self.listing_url_template, PAGE_PLACEHOLDER
            )));
        }
        if self.max_concurrency == 0 {
            return Err(ScraperError::ConfigError(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        self.rules.validate()
    }

    pub fn listing_url(&self, page: usize) -> ScraperResult<Url> {
        let url = self
            .listing_url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string());
        Ok(Url::parse(&url)?)
    }

    /// Identifies the source site for cache keys.
    pub fn fingerprint(&self) -> String {
        self.listing_url_template.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_substitutes_page() {
        let config = CrawlConfig::default();
        assert_eq!(
            config.listing_url(3).unwrap().as_str(),
            "http://books.toscrape.com/catalogue/page-3.html"
        );
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let missing_placeholder = CrawlConfig::default().with_listing_url("http://example.com/");
        assert!(matches!(
            missing_placeholder.validate(),
            Err(ScraperError::ConfigError(_))
        ));

        let no_workers = CrawlConfig::default().with_concurrency(0);
        assert!(matches!(
            no_workers.validate(),
            Err(ScraperError::ConfigError(_))
        ));

        assert!(CrawlConfig::default().validate().is_ok());
    }
}
