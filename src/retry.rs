use std::future::Future;
use std::time::Duration;

use log::{info, warn};

use crate::config::RetryConfig;

/// Execute an operation with exponential backoff, retrying while `retryable`
/// says the result is transient and attempts remain.
///
/// Counting includes the first attempt: `max_attempts = 10` means at most 10
/// calls to `operation`. Errors from the operation itself are returned
/// immediately; only successfully-produced values are inspected for retry,
/// which for HTTP means transport failures surface at once while rate-limit
/// and transient server statuses back off and go again.
pub async fn send_with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    retryable: impl Fn(&T) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1u32;
    let mut delay = config.initial_delay();

    loop {
        let result = operation().await?;

        if retryable(&result) && attempt < config.max_attempts {
            warn!(
                "Transient response on attempt {}/{}, retrying in {:?}",
                attempt, config.max_attempts, delay
            );

            tokio::time::sleep(delay).await;

            let next = Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
            delay = next.min(config.max_delay());
            attempt += 1;
            continue;
        }

        if attempt > 1 {
            info!("Request completed after {} attempts", attempt);
        }
        return Ok(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay_ms: 10,
            max_delay_ms: 100,
            backoff_multiplier: 2.0,
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }

    #[tokio::test]
    async fn test_success_returns_without_retry() {
        let config = fast_config(10);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let status = send_with_retry(
            &config,
            || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<u16, Infallible>(200)
                }
            },
            |status| config.should_retry(*status),
        )
        .await
        .unwrap();

        assert_eq!(status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_statuses_retry_until_success() {
        let config = fast_config(10);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let status = send_with_retry(
            &config,
            || {
                let calls = calls_clone.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 3 {
                        Ok::<u16, Infallible>(503)
                    } else {
                        Ok(200)
                    }
                }
            },
            |status| config.should_retry(*status),
        )
        .await
        .unwrap();

        assert_eq!(status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 4, "three 503s then a 200");
    }

    #[tokio::test]
    async fn test_exhausted_attempts_return_last_response() {
        let config = fast_config(3);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let status = send_with_retry(
            &config,
            || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<u16, Infallible>(503)
                }
            },
            |status| config.should_retry(*status),
        )
        .await
        .unwrap();

        assert_eq!(status, 503, "the final response is handed to the caller");
        assert_eq!(calls.load(Ordering::SeqCst), 3, "max_attempts bounds total calls");
    }

    #[tokio::test]
    async fn test_non_retryable_status_returns_immediately() {
        let config = fast_config(10);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let status = send_with_retry(
            &config,
            || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<u16, Infallible>(404)
                }
            },
            |status| config.should_retry(*status),
        )
        .await
        .unwrap();

        assert_eq!(status, 404);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_operation_error_is_not_retried() {
        let config = fast_config(10);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<u16, &str> = send_with_retry(
            &config,
            || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("connection refused")
                }
            },
            |status| config.should_retry(*status),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backoff_delays_grow_exponentially() {
        let config = fast_config(3);
        let timestamps = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let ts_clone = timestamps.clone();

        let _ = send_with_retry(
            &config,
            || {
                let ts = ts_clone.clone();
                async move {
                    ts.lock().await.push(std::time::Instant::now());
                    Ok::<u16, Infallible>(503)
                }
            },
            |status| config.should_retry(*status),
        )
        .await;

        let ts = timestamps.lock().await;
        assert_eq!(ts.len(), 3);

        let gap1 = ts[1].duration_since(ts[0]);
        let gap2 = ts[2].duration_since(ts[1]);
        assert!(gap1 >= Duration::from_millis(8), "first delay ~10ms, was {:?}", gap1);
        assert!(gap2 >= Duration::from_millis(16), "second delay ~20ms, was {:?}", gap2);
    }
}
