use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ContentRetryCondition {
    pub pattern: String,
    pub is_regex: bool,
}

#[derive(Debug, Clone)]
pub enum RetryCondition {
    StatusCode(u16),
    StatusRange(u16, u16),
    Content(ContentRetryCondition),
    NetworkError,
}

#[derive(Debug, Clone, Copy)]
pub enum BackoffPolicy {
    Constant,
    Linear,
    Exponential { factor: f32 },
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RetryCategory {
    RateLimit,      // 429, rate limiting messages
    ServerError,    // 500-599
    Network,        // connect failures, timeouts
    BotDetection,   // Bot detection, captchas
    Custom(String), // Custom category
}

#[derive(Debug, Clone)]
pub struct CategoryConfig {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_policy: BackoffPolicy,
    pub conditions: Vec<RetryCondition>,
}

/// Retry bookkeeping for a single fetch.
#[derive(Debug, Clone)]
pub struct RetryState {
    pub counts: HashMap<RetryCategory, usize>,
    pub total_retries: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RetryConfig {
    pub categories: HashMap<RetryCategory, CategoryConfig>,
}

/// What a fetch attempt produced, as seen by the retry policy.
#[derive(Debug, Clone, Copy)]
pub enum Attempt<'a> {
    Response { status: u16, body: &'a str },
    NetworkFailure,
}
