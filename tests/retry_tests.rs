use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use lpforge::application::retry::{with_retry, RetryPolicy};

#[tokio::test(start_paused = true)]
async fn exhausted_budget_backs_off_after_every_failure() {
    let calls = AtomicU32::new(0);
    let start = tokio::time::Instant::now();

    let result = with_retry(&RetryPolicy::new(10, 1000), "always-fails", || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err::<(), _>("unreachable node") }
    })
    .await;

    assert_eq!(result.attempts, 10);
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    assert_eq!(result.into_result(), Err("unreachable node"));
    // 1 + 2 + 4 + ... + 512 seconds, the last failure included
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1_023_000));
    assert!(elapsed < Duration::from_millis(1_024_000));
}

#[tokio::test(start_paused = true)]
async fn success_on_last_attempt_is_success() {
    let calls = AtomicU32::new(0);

    let result = with_retry(&RetryPolicy::new(3, 10), "flaky", || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if n < 3 {
                Err("timeout")
            } else {
                Ok(n)
            }
        }
    })
    .await;

    assert!(result.succeeded());
    assert_eq!(result.attempts, 3);
    assert_eq!(result.into_result(), Ok(3));
}

#[tokio::test(start_paused = true)]
async fn recovers_after_transient_failures() {
    let calls = AtomicU32::new(0);
    let start = tokio::time::Instant::now();

    let result = with_retry(&RetryPolicy::new(5, 100), "recovering", || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move { if n == 0 { Err("reset") } else { Ok("ok") } }
    })
    .await;

    assert_eq!(result.attempts, 2);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(200));
}

#[test]
fn policy_deserializes_with_defaults() {
    let policy: RetryPolicy = toml::from_str("max_attempts = 3").unwrap();
    assert_eq!(policy, RetryPolicy::new(3, 1000));
}
