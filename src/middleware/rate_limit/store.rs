use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::debug;
use async_trait::async_trait;

use super::config::RateLimitConfig;

/// 몇 번의 검사마다 만료 항목을 청소할지
const CLEANUP_INTERVAL: u64 = 100;

/// 한 번의 한도 검사 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// 요청 허용 여부
    pub allowed: bool,
    /// 윈도우당 최대 요청 수
    pub limit: u32,
    /// 현재 윈도우에 남은 요청 수
    pub remaining: u32,
    /// 윈도우가 리셋되는 시각 (epoch 밀리초)
    pub reset_at: u64,
}

/// 클라이언트별 윈도우 항목
#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: u64,
}

/// 속도 제한 저장소 trait
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// 요청 하나를 계수하고 허용 여부를 결정합니다.
    async fn check(&self, client_id: &str) -> RateLimitDecision;

    /// 현재 윈도우에 남은 요청 수를 반환합니다.
    async fn remaining_requests(&self, client_id: &str) -> u32;

    /// 윈도우 리셋 시각을 반환합니다 (epoch 밀리초, 항목이 없으면 0).
    async fn reset_time(&self, client_id: &str) -> u64;

    /// 만료된 항목을 모두 제거합니다.
    async fn cleanup(&self);
}

/// 고정 윈도우 카운터 저장소
///
/// 멀티스레드 런타임에서 동작하므로 계수-비교는 단일 쓰기 락 아래에서
/// 수행됩니다. 같은 식별자에 대한 허용/거부 판정은 이 임계 구역이
/// 보장합니다.
#[derive(Debug, Clone)]
pub struct FixedWindowStore {
    config: RateLimitConfig,
    entries: Arc<RwLock<HashMap<String, WindowEntry>>>,
    checks: Arc<AtomicU64>,
}

impl FixedWindowStore {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
            checks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 추적 중인 식별자 수 (만료 포함)
    pub async fn tracked_clients(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// 현재 시각을 epoch 밀리초로 반환합니다.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[async_trait]
impl RateLimitStore for FixedWindowStore {
    async fn check(&self, client_id: &str) -> RateLimitDecision {
        let now = now_millis();
        let max = self.config.max_requests;
        let mut entries = self.entries.write().await;

        // 주기적인 기회적 청소: 전용 타이머 대신 검사 횟수로 분할 상환
        let checks = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if checks % CLEANUP_INTERVAL == 0 {
            entries.retain(|_, entry| entry.reset_at >= now);
        }

        let entry = entries
            .entry(client_id.to_string())
            .or_insert_with(|| WindowEntry { count: 0, reset_at: 0 });

        if now > entry.reset_at {
            // 첫 요청이거나 윈도우가 지난 경우: 계수를 1로 되돌림
            entry.count = 1;
            entry.reset_at = now + self.config.window_ms;
            debug!(client_id = %client_id, reset_at = entry.reset_at, "새 rate limit 윈도우 시작");
        } else if entry.count < max {
            entry.count += 1;
        } else {
            // 거부 시에는 계수를 올리지 않음
            return RateLimitDecision {
                allowed: false,
                limit: max,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        RateLimitDecision {
            allowed: true,
            limit: max,
            remaining: max.saturating_sub(entry.count),
            reset_at: entry.reset_at,
        }
    }

    async fn remaining_requests(&self, client_id: &str) -> u32 {
        let now = now_millis();
        let entries = self.entries.read().await;
        match entries.get(client_id) {
            Some(entry) if now <= entry.reset_at => {
                self.config.max_requests.saturating_sub(entry.count)
            }
            _ => self.config.max_requests,
        }
    }

    async fn reset_time(&self, client_id: &str) -> u64 {
        let entries = self.entries.read().await;
        entries.get(client_id).map(|entry| entry.reset_at).unwrap_or(0)
    }

    async fn cleanup(&self) {
        let now = now_millis();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_at >= now);
        if entries.len() < before {
            debug!(removed = before - entries.len(), "만료된 rate limit 항목 제거");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(max_requests: u32, window_ms: u64) -> FixedWindowStore {
        FixedWindowStore::new(RateLimitConfig {
            enabled: true,
            max_requests,
            window_ms,
        })
    }

    #[tokio::test]
    async fn test_burst_allows_exactly_max_requests() {
        let store = test_store(3, 60_000);

        for expected_remaining in [2, 1, 0] {
            let decision = store.check("client-a").await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = store.check("client-a").await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);

        // 거부는 계수를 올리지 않으므로 남은 수는 그대로 0
        assert_eq!(store.remaining_requests("client-a").await, 0);
    }

    #[tokio::test]
    async fn test_identifiers_are_independent() {
        let store = test_store(1, 60_000);

        assert!(store.check("client-a").await.allowed);
        assert!(!store.check("client-a").await.allowed);
        assert!(store.check("client-b").await.allowed);
    }

    #[tokio::test]
    async fn test_window_reset_allows_again() {
        let store = test_store(1, 30);

        assert!(store.check("client-a").await.allowed);
        assert!(!store.check("client-a").await.allowed);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let decision = store.check("client-a").await;
        assert!(decision.allowed);
        // 새 윈도우에서 계수가 1로 초기화됨
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_reset_time_unknown_client() {
        let store = test_store(5, 60_000);
        assert_eq!(store.reset_time("nobody").await, 0);

        store.check("client-a").await;
        assert!(store.reset_time("client-a").await > 0);
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired_entries() {
        let store = test_store(5, 20);

        store.check("client-a").await;
        store.check("client-b").await;
        assert_eq!(store.tracked_clients().await, 2);

        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
        store.cleanup().await;
        assert_eq!(store.tracked_clients().await, 0);
    }
}
