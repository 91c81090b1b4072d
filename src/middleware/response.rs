use hyper::{Response, StatusCode};
use http_body_util::Full;
use bytes::Bytes;
use super::MiddlewareError;

/// 미들웨어 에러를 HTTP 응답으로 변환합니다.
pub fn handle_middleware_error(err: MiddlewareError) -> Response<Full<Bytes>> {
    match err {
        // 한도 초과는 미들웨어가 만들어 둔 응답을 그대로 사용
        MiddlewareError::RateLimited { response } => response,
        MiddlewareError::Config(_) | MiddlewareError::Processing(_) => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Full::new(Bytes::from("Internal Server Error")))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error")))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_internal_error() {
        let response = handle_middleware_error(MiddlewareError::Config("bad".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rate_limited_error_returns_prepared_response() {
        let prepared = Response::builder()
            .status(StatusCode::TOO_MANY_REQUESTS)
            .body(Full::new(Bytes::from("slow down")))
            .unwrap();

        let response = handle_middleware_error(MiddlewareError::RateLimited { response: prepared });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
