use super::types::*;
use super::utils::*;
use std::collections::HashMap;
use std::time::Duration;

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_policy: BackoffPolicy::Exponential { factor: 2.0 },
            conditions: Vec::new(),
        }
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            total_retries: 0,
        }
    }
}

impl RetryConfig {
    /// Retries 429, 5xx and network failures with exponential backoff.
    pub fn transient(max_retries: usize) -> Self {
        let mut config = Self::default();
        config.categories.insert(
            RetryCategory::RateLimit,
            CategoryConfig {
                max_retries,
                conditions: vec![RetryCondition::StatusCode(429)],
                ..Default::default()
            },
        );
        config.categories.insert(
            RetryCategory::ServerError,
            CategoryConfig {
                max_retries,
                initial_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(10),
                conditions: vec![RetryCondition::StatusRange(500, 599)],
                ..Default::default()
            },
        );
        config.categories.insert(
            RetryCategory::Network,
            CategoryConfig {
                max_retries,
                initial_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(10),
                conditions: vec![RetryCondition::NetworkError],
                ..Default::default()
            },
        );
        config
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn should_retry(
        &self,
        state: &mut RetryState,
        attempt: Attempt<'_>,
    ) -> Option<(RetryCategory, Duration)> {
        for (category, config) in &self.categories {
            let current_retries = state.counts.get(category).copied().unwrap_or(0);
            if current_retries >= config.max_retries {
                continue;
            }

            if config
                .conditions
                .iter()
                .any(|condition| retry_condition_should_apply(condition, attempt))
            {
                state.counts.insert(category.clone(), current_retries + 1);
                state.total_retries += 1;
                let delay = calculate_delay(config, current_retries);
                return Some((category.clone(), delay));
            }
        }
        None
    }
}

impl CategoryConfig {
    pub fn calculate_delay(&self, attempt: usize) -> Duration {
        calculate_delay(self, attempt)
    }
}
