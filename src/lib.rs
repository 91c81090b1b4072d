//! Community Gateway는 마인크래프트 커뮤니티 사이트의 API 앞단을 지키는
//! 보안 게이트웨이입니다.
//!
//! # 주요 기능
//!
//! - 선언적 스키마 기반 페이로드 검증/정화
//! - 클라이언트 식별자별 고정 윈도우 rate limiting
//! - CSP/HSTS/Permissions-Policy 등 보안 응답 헤더 조립
//!
//! # 예제
//!
//! ```
//! use community_gateway::validation::{validate, schemas, ValidationOptions};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "content": "마을 회관 앞에 경매장이 열렸습니다",
//! });
//!
//! let result = validate(
//!     payload.as_object().unwrap(),
//!     &schemas::comment(),
//!     &ValidationOptions::default(),
//! );
//! assert!(result.is_valid);
//! ```
//!
//! # Rate Limiting
//!
//! ```
//! use community_gateway::middleware::rate_limit::{
//!     FixedWindowStore, RateLimitConfig, RateLimitStore,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let store = FixedWindowStore::new(RateLimitConfig {
//!         enabled: true,
//!         max_requests: 3,
//!         window_ms: 1000,
//!     });
//!
//!     for _ in 0..3 {
//!         assert!(store.check("client-a").await.allowed);
//!     }
//!     assert!(!store.check("client-a").await.allowed);
//! }
//! ```

pub mod logging;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod validation;
