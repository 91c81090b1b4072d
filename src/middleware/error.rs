use super::Response;

#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("처리 오류: {0}")]
    Processing(String),

    /// 요청 한도 초과. 거부 응답(429, 재시도 힌트 포함)을 함께 전달합니다.
    #[error("요청 한도 초과")]
    RateLimited { response: Response },
}
