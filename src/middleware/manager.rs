use tracing::debug;

use super::rate_limit::{FixedWindowStore, RateLimitConfig, RateLimitMiddleware};
use super::security_headers::{SecurityHeadersConfig, SecurityHeadersMiddleware};
use super::{MiddlewareChain, MiddlewareError, Request, Response};

/// 게이트웨이의 미들웨어 체인을 소유하는 매니저
///
/// 저장소 인스턴스는 바깥에서 만들어 주입하므로 테스트마다 독립된
/// 카운터를 쓸 수 있습니다.
pub struct MiddlewareManager {
    chain: MiddlewareChain,
}

impl MiddlewareManager {
    pub fn new(
        security: &SecurityHeadersConfig,
        rate_limit: &RateLimitConfig,
        store: FixedWindowStore,
    ) -> Self {
        let mut chain = MiddlewareChain::new();

        if rate_limit.enabled {
            debug!(
                max_requests = rate_limit.max_requests,
                window_ms = rate_limit.window_ms,
                "rate limit 미들웨어 활성화"
            );
            chain.add(RateLimitMiddleware::new(rate_limit.clone(), store));
        }

        chain.add(SecurityHeadersMiddleware::new(security.clone()));

        Self { chain }
    }

    pub async fn handle_request(&self, req: Request) -> Result<Request, MiddlewareError> {
        self.chain.handle_request(req).await
    }

    pub async fn handle_response(&self, res: Response) -> Result<Response, MiddlewareError> {
        self.chain.handle_response(res).await
    }
}
