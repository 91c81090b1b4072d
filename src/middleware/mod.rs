//! 요청 수명주기에 끼어드는 보안 미들웨어 모듈입니다.

pub mod chain;
pub mod error;
pub mod manager;
pub mod rate_limit;
pub mod response;
pub mod security_headers;
pub mod traits;

pub use chain::MiddlewareChain;
pub use error::MiddlewareError;
pub use manager::MiddlewareManager;
pub use response::handle_middleware_error;
pub use traits::Middleware;

/// 미들웨어 체인을 통과하는 요청 타입
pub type Request = hyper::Request<hyper::body::Incoming>;

/// 미들웨어 체인을 통과하는 응답 타입
pub type Response = hyper::Response<http_body_util::Full<bytes::Bytes>>;
