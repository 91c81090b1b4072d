use crate::middleware::{Middleware, MiddlewareError, Request, Response};
use super::config::SecurityHeadersConfig;
use async_trait::async_trait;
use hyper::header::{HeaderName, HeaderValue};
use tracing::warn;

/// 보안 헤더 미들웨어
///
/// 모든 응답(오류 응답 포함)에 설정된 보안 헤더를 붙입니다.
pub struct SecurityHeadersMiddleware {
    config: SecurityHeadersConfig,
}

impl SecurityHeadersMiddleware {
    pub fn new(config: SecurityHeadersConfig) -> Self {
        Self { config }
    }
}

/// 응답에 보안 헤더를 적용한 새 응답을 반환합니다.
///
/// 입력 응답을 변경하는 대신 본문/상태를 유지한 채 헤더만 보강하므로
/// 다른 응답 가공 단계와 자유롭게 조합할 수 있습니다. 헤더 하나의 값이
/// 인코딩되지 않아도 나머지 헤더는 계속 설정됩니다.
pub fn apply_security_headers(
    response: Response,
    config: &SecurityHeadersConfig,
) -> Response {
    let (mut parts, body) = response.into_parts();
    let headers = &mut parts.headers;

    let mut insert = |name: &'static str, value: String| {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(name), value);
            }
            Err(e) => {
                warn!(header = name, error = %e, "보안 헤더 값 인코딩 실패");
            }
        }
    };

    if config.enable_csp {
        insert("content-security-policy", config.csp_header());
    }
    if config.enable_hsts {
        insert("strict-transport-security", config.hsts_header());
    }
    if config.enable_permissions_policy {
        insert(
            "permissions-policy",
            SecurityHeadersConfig::permissions_policy_header(),
        );
    }

    if config.enable_frame_options {
        headers.insert(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("SAMEORIGIN"),
        );
    }
    if config.enable_content_type_options {
        headers.insert(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        );
    }
    if config.enable_referrer_policy {
        headers.insert(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        );
    }

    // 설정과 무관하게 항상 붙는 보강 헤더
    headers.insert(
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("1; mode=block"),
    );
    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );
    headers.insert(
        HeaderName::from_static("x-download-options"),
        HeaderValue::from_static("noopen"),
    );
    headers.insert(
        HeaderName::from_static("x-permitted-cross-domain-policies"),
        HeaderValue::from_static("none"),
    );

    hyper::Response::from_parts(parts, body)
}

#[async_trait]
impl Middleware for SecurityHeadersMiddleware {
    fn name(&self) -> &str {
        "security-headers"
    }

    async fn handle_request(&self, req: Request) -> Result<Request, MiddlewareError> {
        Ok(req)
    }

    async fn handle_response(&self, res: Response) -> Result<Response, MiddlewareError> {
        Ok(apply_security_headers(res, &self.config))
    }
}
