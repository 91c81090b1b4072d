use std::time::Duration;

use community_gateway::middleware::rate_limit::{
    derive_client_id, FixedWindowStore, RateLimitConfig, RateLimitStore,
};
use hyper::header::{HeaderMap, HeaderValue};

fn store(max_requests: u32, window_ms: u64) -> FixedWindowStore {
    FixedWindowStore::new(RateLimitConfig {
        enabled: true,
        max_requests,
        window_ms,
    })
}

#[tokio::test]
async fn test_burst_of_four_with_limit_three() {
    let store = store(3, 1000);

    let results: Vec<bool> = [
        store.check("client-a").await.allowed,
        store.check("client-a").await.allowed,
        store.check("client-a").await.allowed,
        store.check("client-a").await.allowed,
    ]
    .to_vec();

    assert_eq!(results, vec![true, true, true, false]);
}

#[tokio::test]
async fn test_remaining_counts_down_then_stays_at_zero() {
    let store = store(3, 60_000);

    let mut remaining = Vec::new();
    for _ in 0..3 {
        remaining.push(store.check("client-a").await.remaining);
    }
    assert_eq!(remaining, vec![2, 1, 0]);

    // 거부된 요청은 계수되지 않으므로 남은 수는 0에 머묾
    for _ in 0..3 {
        let decision = store.check("client-a").await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }
    assert_eq!(store.remaining_requests("client-a").await, 0);
}

#[tokio::test]
async fn test_unknown_client_has_full_budget_and_zero_reset() {
    let store = store(5, 60_000);

    assert_eq!(store.remaining_requests("stranger").await, 5);
    assert_eq!(store.reset_time("stranger").await, 0);
}

#[tokio::test]
async fn test_throttled_client_recovers_after_window() {
    let store = store(1, 40);

    assert!(store.check("client-a").await.allowed);
    assert!(!store.check("client-a").await.allowed);

    tokio::time::sleep(Duration::from_millis(60)).await;

    // 윈도우가 지나면 계수가 1로 초기화되어 다시 허용됨
    let decision = store.check("client-a").await;
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 0);
}

#[tokio::test]
async fn test_reset_time_moves_forward_on_new_window() {
    let store = store(1, 40);

    let first = store.check("client-a").await.reset_at;
    tokio::time::sleep(Duration::from_millis(60)).await;
    let second = store.check("client-a").await.reset_at;

    assert!(second > first);
}

#[tokio::test]
async fn test_cleanup_drops_only_expired_entries() {
    let store = store(5, 50);

    store.check("old-client").await;
    tokio::time::sleep(Duration::from_millis(70)).await;
    store.check("fresh-client").await;

    store.cleanup().await;

    assert_eq!(store.tracked_clients().await, 1);
    assert_eq!(store.reset_time("old-client").await, 0);
    assert!(store.reset_time("fresh-client").await > 0);
}

#[test]
fn test_client_identifier_priority() {
    let mut headers = HeaderMap::new();
    headers.insert("user-agent", HeaderValue::from_static("BlockBrowser/1.0"));
    let ua_only = derive_client_id(&headers);
    assert!(ua_only.starts_with("ua-"));

    headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
    assert_eq!(derive_client_id(&headers), "198.51.100.7");

    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_static("203.0.113.9, 198.51.100.7"),
    );
    assert_eq!(derive_client_id(&headers), "203.0.113.9");
}
