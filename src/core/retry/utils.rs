use super::types::*;
use regex::Regex;
use std::time::Duration;

pub fn retry_condition_should_apply(condition: &RetryCondition, attempt: Attempt<'_>) -> bool {
    match (condition, attempt) {
        (RetryCondition::StatusCode(code), Attempt::Response { status, .. }) => *code == status,
        (RetryCondition::StatusRange(low, high), Attempt::Response { status, .. }) => {
            (*low..=*high).contains(&status)
        }
        (RetryCondition::Content(content_condition), Attempt::Response { body, .. }) => {
            check_content_condition(content_condition, body)
        }
        (RetryCondition::NetworkError, Attempt::NetworkFailure) => true,
        _ => false,
    }
}

fn check_content_condition(condition: &ContentRetryCondition, content: &str) -> bool {
    if condition.is_regex {
        Regex::new(&condition.pattern)
            .map(|re| re.is_match(content))
            .unwrap_or(false)
    } else {
        content
            .to_lowercase()
            .contains(&condition.pattern.to_lowercase())
    }
}

pub fn calculate_delay(config: &CategoryConfig, attempt: usize) -> Duration {
    if attempt == 0 {
        return config.initial_delay;
    }

    let delay = match config.backoff_policy {
        BackoffPolicy::Constant => config.initial_delay,
        BackoffPolicy::Linear => config.initial_delay.mul_f32(attempt as f32),
        BackoffPolicy::Exponential { factor } => {
            config.initial_delay.mul_f32(factor.powi(attempt as i32))
        }
    };

    std::cmp::min(delay, config.max_delay)
}
