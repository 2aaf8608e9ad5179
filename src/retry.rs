//! Bounded retries for store operations that fail because the database is busy.

use std::{thread, time::Duration};

use crate::Error;

/// Maximum number of retries after the first attempt.
const MAX_RETRIES: u32 = 3;
/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 10;
/// Maximum delay cap (milliseconds).
const MAX_DELAY_MS: u64 = 200;

/// Run `operation`, retrying with exponential backoff while it fails with
/// [Error::StoreUnavailable].
///
/// Any other error, including validation errors, is returned immediately.
/// Each attempt must run in its own transaction so that a failed attempt is
/// rolled back before the next one starts, and must take the connection lock
/// itself so the lock is released during the backoff.
///
/// The backoff sleeps on the calling thread. SQLite already waits up to the
/// connection's busy timeout before reporting a busy database, so a retry
/// only happens under sustained contention.
pub fn with_retry<F, R>(mut operation: F) -> Result<R, Error>
where
    F: FnMut() -> Result<R, Error>,
{
    let mut attempt = 0u32;

    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(Error::StoreUnavailable(reason)) if attempt < MAX_RETRIES => {
                attempt += 1;
                let delay_ms = (BASE_DELAY_MS * 2u64.pow(attempt - 1)).min(MAX_DELAY_MS);
                tracing::warn!(
                    "store unavailable ({reason}), retrying in {delay_ms} ms (attempt {attempt} of {MAX_RETRIES})"
                );
                thread::sleep(Duration::from_millis(delay_ms));
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod retry_tests {
    use crate::Error;

    use super::{MAX_RETRIES, with_retry};

    #[test]
    fn returns_first_success() {
        let mut calls = 0;

        let result = with_retry(|| {
            calls += 1;
            Ok::<_, Error>(42)
        });

        assert_eq!(result, Ok(42));
        assert_eq!(calls, 1);
    }

    #[test]
    fn retries_until_store_is_available() {
        let mut calls = 0;

        let result = with_retry(|| {
            calls += 1;
            if calls < 3 {
                Err(Error::StoreUnavailable("database is locked".to_owned()))
            } else {
                Ok("done")
            }
        });

        assert_eq!(result, Ok("done"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let mut calls = 0;

        let result: Result<(), Error> = with_retry(|| {
            calls += 1;
            Err(Error::StoreUnavailable("database is locked".to_owned()))
        });

        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
        assert_eq!(calls, MAX_RETRIES + 1);
    }

    #[test]
    fn does_not_retry_validation_errors() {
        let mut calls = 0;

        let result: Result<(), Error> = with_retry(|| {
            calls += 1;
            Err(Error::DuplicateCategoryName("diet".to_owned()))
        });

        assert_eq!(result, Err(Error::DuplicateCategoryName("diet".to_owned())));
        assert_eq!(calls, 1);
    }
}
