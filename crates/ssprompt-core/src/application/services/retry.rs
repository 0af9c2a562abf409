//! Bounded retry loop shared by the hub-facing services.

use std::thread;
use tracing::{error, warn};

use crate::domain::RetryPolicy;
use crate::error::SspromptResult;

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are spent. Sleeps `policy.delay()` between attempts.
pub(crate) fn with_retries<T>(
    policy: &RetryPolicy,
    what: &str,
    mut op: impl FnMut() -> SspromptResult<T>,
) -> SspromptResult<T> {
    let attempts = policy.total_attempts();
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "{what} failed, retrying in {}ms",
                    policy.delay_ms
                );
                if policy.delay_ms > 0 {
                    thread::sleep(policy.delay());
                }
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    error!(attempts, error = %e, "{what}: max retry attempts reached");
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::domain::DomainError;
    use std::cell::Cell;

    #[test]
    fn stops_after_total_attempts() {
        let calls = Cell::new(0);
        let result: SspromptResult<()> = with_retries(&RetryPolicy::new(3, 0), "op", || {
            calls.set(calls.get() + 1);
            Err(ApplicationError::transport("x", Some(500), "boom").into())
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn succeeds_on_later_attempt() {
        let calls = Cell::new(0);
        let result = with_retries(&RetryPolicy::new(3, 0), "op", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(ApplicationError::transport("x", None, "timeout").into())
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn non_retryable_errors_return_immediately() {
        let calls = Cell::new(0);
        let result: SspromptResult<()> = with_retries(&RetryPolicy::new(3, 0), "op", || {
            calls.set(calls.get() + 1);
            Err(DomainError::UnsafeEntryName { name: "..".into() }.into())
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn no_retry_policy_tries_once() {
        let calls = Cell::new(0);
        let _: SspromptResult<()> = with_retries(&RetryPolicy::no_retry(), "op", || {
            calls.set(calls.get() + 1);
            Err(ApplicationError::transport("x", Some(404), "not found").into())
        });
        assert_eq!(calls.get(), 1);
    }
}
