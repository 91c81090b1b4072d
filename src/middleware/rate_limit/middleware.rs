use crate::middleware::{Middleware, MiddlewareError, Request, Response};
use super::config::RateLimitConfig;
use super::store::{now_millis, RateLimitDecision, RateLimitStore};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use hyper::StatusCode;
use http_body_util::Full;
use bytes::Bytes;
use tracing::{debug, warn};

/// User-Agent 대체 식별자의 길이
const UA_HASH_LENGTH: usize = 16;

/// Rate Limit 미들웨어
///
/// 허용된 요청에는 판정 결과를 extension으로 붙여 핸들러가 응답 헤더를
/// 채울 수 있게 하고, 거부된 요청에는 준비된 429 응답을 에러로 돌려줍니다.
pub struct RateLimitMiddleware<S: RateLimitStore> {
    config: RateLimitConfig,
    store: S,
}

impl<S: RateLimitStore> RateLimitMiddleware<S> {
    pub fn new(config: RateLimitConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Rate Limit 초과 응답을 생성합니다.
    fn too_many_requests_response(decision: &RateLimitDecision) -> Response {
        let retry_after = retry_after_secs(decision.reset_at);
        let body = serde_json::json!({
            "error": "Too many requests",
            "retryAfter": retry_after,
        });

        let mut response = hyper::Response::builder()
            .status(StatusCode::TOO_MANY_REQUESTS)
            .header(CONTENT_TYPE, "application/json")
            .header(RETRY_AFTER, retry_after.to_string())
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap_or_else(|_| {
                hyper::Response::new(Full::new(Bytes::from("Too many requests")))
            });

        apply_rate_limit_headers(response.headers_mut(), decision);
        response
    }
}

/// 요청 헤더에서 클라이언트 식별자를 추출합니다.
///
/// 우선순위: `X-Forwarded-For` 첫 항목 → `X-Real-IP` → User-Agent 해시.
/// 신뢰할 수 있는 리버스 프록시 뒤가 아니라면 헤더를 위조하는
/// 클라이언트가 속일 수 있는 최선 노력 식별입니다.
pub fn derive_client_id(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|h| h.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    // 주소 헤더가 없으면 User-Agent를 16자로 줄인 약한 해시 사용
    if let Some(agent) = headers.get(USER_AGENT).and_then(|h| h.to_str().ok()) {
        let encoded = BASE64.encode(agent.as_bytes());
        let hash: String = encoded.chars().take(UA_HASH_LENGTH).collect();
        return format!("ua-{}", hash);
    }

    "unknown".to_string()
}

/// 허용/거부와 무관하게 붙는 rate limit 헤더를 설정합니다.
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let pairs = [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        // 헤더는 관례대로 epoch 초 단위
        ("x-ratelimit-reset", (decision.reset_at / 1000).to_string()),
    ];

    for (name, value) in pairs {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(name, value);
        }
    }
}

fn retry_after_secs(reset_at: u64) -> u64 {
    let now = now_millis();
    reset_at.saturating_sub(now).div_ceil(1000)
}

#[async_trait]
impl<S: RateLimitStore> Middleware for RateLimitMiddleware<S> {
    fn name(&self) -> &str {
        "rate-limit"
    }

    async fn handle_request(&self, mut req: Request) -> Result<Request, MiddlewareError> {
        if !self.config.enabled {
            return Ok(req);
        }

        let client_id = derive_client_id(req.headers());
        let decision = self.store.check(&client_id).await;
        debug!(
            client_id = %client_id,
            allowed = decision.allowed,
            remaining = decision.remaining,
            "rate limit 검사"
        );

        if decision.allowed {
            req.extensions_mut().insert(decision);
            Ok(req)
        } else {
            warn!(client_id = %client_id, "요청 한도 초과로 거부");
            Err(MiddlewareError::RateLimited {
                response: Self::too_many_requests_response(&decision),
            })
        }
    }

    async fn handle_response(&self, res: Response) -> Result<Response, MiddlewareError> {
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));

        assert_eq!(derive_client_id(&headers), "203.0.113.9");
    }

    #[test]
    fn test_client_id_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));

        assert_eq!(derive_client_id(&headers), "198.51.100.7");
    }

    #[test]
    fn test_client_id_falls_back_to_user_agent_hash() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64)"));

        let id = derive_client_id(&headers);
        assert!(id.starts_with("ua-"));
        assert_eq!(id.chars().count(), "ua-".len() + UA_HASH_LENGTH);

        // 같은 User-Agent는 같은 식별자로
        assert_eq!(id, derive_client_id(&headers));
    }

    #[test]
    fn test_client_id_unknown_without_headers() {
        assert_eq!(derive_client_id(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_denied_response_contract() {
        let decision = RateLimitDecision {
            allowed: false,
            limit: 10,
            remaining: 0,
            reset_at: now_millis() + 30_000,
        };

        let response = RateLimitMiddleware::<crate::middleware::rate_limit::FixedWindowStore>::
            too_many_requests_response(&decision);

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("x-ratelimit-limit").unwrap(),
            "10"
        );
        assert_eq!(
            response.headers().get("x-ratelimit-remaining").unwrap(),
            "0"
        );
        assert!(response.headers().contains_key("x-ratelimit-reset"));
        assert!(response.headers().contains_key(RETRY_AFTER));
    }
}
