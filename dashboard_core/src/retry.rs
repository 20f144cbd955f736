//! Fixed-pause retry for upstream fetches.

use std::{fmt::Display, future::Future, num::NonZeroU32, time::Duration};

use nonzero_ext::nonzero;
use tracing::warn;

/// How often to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: NonZeroU32,
    /// Pause between attempts.
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: nonzero!(2u32),
            pause: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retry.
    pub fn once() -> Self {
        Self {
            attempts: nonzero!(1u32),
            pause: Duration::ZERO,
        }
    }
}

/// Runs `op` until it succeeds, `retryable` rejects the error, or the
/// attempts are used up. The pause is awaited in line, so it lengthens the
/// caller's pass.
pub async fn retry_fixed<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    what: &str,
    retryable: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let attempts = policy.attempts.get();
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < attempts && retryable(&e) => {
                warn!(what, attempt, attempts, error = %e, "fetch failed, retrying");
                tokio::time::sleep(policy.pause).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts: NonZeroU32::new(attempts).unwrap(),
            pause: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn second_attempt_can_succeed() {
        let calls = &Cell::new(0);
        let out = retry_fixed(&quick(2), "bars", |_: &String| true, || async move {
            calls.set(calls.get() + 1);
            if calls.get() == 1 { Err("flaky".to_string()) } else { Ok(7) }
        })
        .await;
        assert_eq!(out, Ok(7));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_attempts() {
        let calls = &Cell::new(0);
        let out: Result<(), String> = retry_fixed(&quick(2), "bars", |_| true, || async move {
            calls.set(calls.get() + 1);
            Err("down".to_string())
        })
        .await;
        assert_eq!(out, Err("down".to_string()));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn non_retryable_errors_return_immediately() {
        let calls = &Cell::new(0);
        let out: Result<(), String> = retry_fixed(&quick(3), "bars", |_| false, || async move {
            calls.set(calls.get() + 1);
            Err("bad interval".to_string())
        })
        .await;
        assert!(out.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn default_is_two_attempts_one_second_apart() {
        let p = RetryPolicy::default();
        assert_eq!(p.attempts.get(), 2);
        assert_eq!(p.pause, Duration::from_secs(1));
    }
}
