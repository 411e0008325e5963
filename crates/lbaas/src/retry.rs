//! Retry logic with exponential backoff for transient errors.

use crate::error::{Error, Result};
use crate::types::RetryConfig;
use std::thread;

/// Callback trait for retry progress notifications.
pub trait RetryCallback {
    /// Called when an operation is being retried.
    ///
    /// # Arguments
    /// * `attempt` - Current attempt number (1-indexed)
    /// * `max_attempts` - Maximum number of attempts
    /// * `error` - The error that triggered the retry
    /// * `delay_ms` - Milliseconds until next attempt
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay_ms: u64);
}

/// Callback that reports retries through the `log` facade.
pub struct LogCallback<'a> {
    /// What is being attempted, e.g. "GET /v2.0/lb/health_monitors/m-1"
    pub label: &'a str,
}

impl RetryCallback for LogCallback<'_> {
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay_ms: u64) {
        log::warn!(
            "{}: attempt {}/{} failed: {}. Retrying in {}ms...",
            self.label,
            attempt,
            max_attempts,
            error,
            delay_ms
        );
    }
}

/// Execute an operation with retry logic.
///
/// Retries the operation if it returns a retryable error, using exponential
/// backoff between attempts.
///
/// # Returns
/// The result of the operation, or the last error if all attempts failed.
pub fn with_retry<T, F>(
    config: &RetryConfig,
    callback: Option<&dyn RetryCallback>,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_error: Option<Error> = None;

    for attempt in 0..config.max_attempts {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }

                if attempt + 1 >= config.max_attempts {
                    last_error = Some(e);
                    break;
                }

                let delay = config.delay_for_attempt(attempt);
                if let Some(cb) = callback {
                    cb.on_retry(
                        attempt + 1,
                        config.max_attempts,
                        &e,
                        delay.as_millis() as u64,
                    );
                }

                thread::sleep(delay);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::Other("retry exhausted".to_string())))
}
