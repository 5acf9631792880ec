use crate::core::retry::RetryCategory;
use crate::{ScraperError, ScraperResult};
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: Url,
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub retry_count: usize,
    pub retry_history: HashMap<RetryCategory, usize>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx response into a `FetchError`.
    pub fn error_for_status(self) -> ScraperResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ScraperError::FetchError {
                url: self.url,
                reason: format!("HTTP status {}", self.status),
            })
        }
    }
}
