//! Transparent retry of conflicting transactions.

use std::future::Future;

use tracing::{debug, warn};

/// Default number of attempts for a transactional unit of work.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// How many times a conflicting transaction is attempted before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Errors that mark a whole unit of work as safe to re-run.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// policy's attempt budget is spent.
///
/// Each invocation must open its own transaction and perform no externally
/// visible side effects before committing.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last retryable one once the
/// budget is exhausted.
pub async fn with_retries<T, E, F, Fut>(
    policy: RetryPolicy,
    operation: &'static str,
    mut attempt: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt_number = 1;

    loop {
        match attempt().await {
            Err(error) if error.is_retryable() && attempt_number < max_attempts => {
                debug!(operation, attempt = attempt_number, "transaction conflict, retrying");

                attempt_number += 1;
            }
            Err(error) if error.is_retryable() => {
                warn!(
                    operation,
                    attempts = attempt_number,
                    "transaction conflict retry budget exhausted"
                );

                return Err(error);
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Conflict,
        Fatal,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Conflict)
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result = with_retries(RetryPolicy::new(5), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TestError::Conflict)
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = with_retries(RetryPolicy::new(3), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);

            Err(TestError::Conflict)
        })
        .await;

        assert_eq!(result, Err(TestError::Conflict));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = with_retries(RetryPolicy::new(3), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);

            Err(TestError::Fatal)
        })
        .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_budget_still_attempts_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = with_retries(RetryPolicy::new(0), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);

            Err(TestError::Conflict)
        })
        .await;

        assert_eq!(result, Err(TestError::Conflict));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
