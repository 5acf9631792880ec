mod r#impl;
mod types;
mod utils;

pub use types::{
    Attempt, BackoffPolicy, CategoryConfig, ContentRetryCondition, RetryCategory, RetryCondition,
    RetryConfig, RetryState,
};

#[cfg(test)]
mod tests;
