use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use crate::logging::{log_request, RequestLog};
use crate::middleware::rate_limit::{apply_rate_limit_headers, derive_client_id, RateLimitDecision};
use crate::middleware::{handle_middleware_error, MiddlewareError, MiddlewareManager, Response};
use crate::validation::{schemas, validate, ValidationOptions, ValidationSchema};

/// 검증 스키마가 붙은 API 경로
struct ApiRoute {
    name: &'static str,
    schema: ValidationSchema,
}

pub struct RequestHandler {
    middleware: MiddlewareManager,
    routes: HashMap<&'static str, ApiRoute>,
}

impl RequestHandler {
    pub fn new(middleware: MiddlewareManager) -> Self {
        let mut routes = HashMap::new();
        routes.insert(
            "/api/profiles",
            ApiRoute {
                name: "profile",
                schema: schemas::user_profile(),
            },
        );
        routes.insert(
            "/api/posts",
            ApiRoute {
                name: "forum_post",
                schema: schemas::forum_post(),
            },
        );
        routes.insert(
            "/api/comments",
            ApiRoute {
                name: "comment",
                schema: schemas::comment(),
            },
        );
        routes.insert(
            "/api/uploads",
            ApiRoute {
                name: "file_upload",
                schema: schemas::file_upload(),
            },
        );

        Self { middleware, routes }
    }

    pub async fn handle_request(
        &self,
        req: hyper::Request<Incoming>,
    ) -> Result<Response, Infallible> {
        let started = Instant::now();
        let mut log = RequestLog::new(Uuid::new_v4().to_string());
        let client_id = derive_client_id(req.headers());
        log.with_request(&req, &client_id);

        // 1. 요청 미들웨어 (rate limit)
        let req = match self.middleware.handle_request(req).await {
            Ok(req) => req,
            Err(e) => {
                if !matches!(e, MiddlewareError::RateLimited { .. }) {
                    log.with_error(&e);
                }
                let response = handle_middleware_error(e);
                return Ok(self.finish(response, None, &mut log, started).await);
            }
        };

        // 허용 판정은 응답의 rate limit 헤더에 그대로 반영됨
        let decision = req.extensions().get::<RateLimitDecision>().copied();

        // 2. 라우팅 + 본문 검증
        let response = self.route(req).await;

        // 3. 응답 미들웨어 (보안 헤더)
        Ok(self.finish(response, decision, &mut log, started).await)
    }

    /// 응답 헤더를 채우고 응답 체인을 거친 뒤 접근 로그를 남깁니다.
    ///
    /// 보안 헤더는 오류 응답을 포함한 모든 응답에 적용됩니다.
    async fn finish(
        &self,
        mut response: Response,
        decision: Option<RateLimitDecision>,
        log: &mut RequestLog,
        started: Instant,
    ) -> Response {
        if let Some(decision) = decision {
            apply_rate_limit_headers(response.headers_mut(), &decision);
        }

        let response = match self.middleware.handle_response(response).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "응답 미들웨어 처리 실패");
                handle_middleware_error(e)
            }
        };

        log.with_response(response.status());
        log.duration_ms = started.elapsed().as_millis() as u64;
        log_request(log);
        response
    }

    async fn route(&self, req: hyper::Request<Incoming>) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        if method == Method::GET && path == "/health" {
            return json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }));
        }

        if method == Method::POST {
            return match self.routes.get(path.as_str()) {
                Some(route) => self.handle_api_request(route, req).await,
                None => not_found(),
            };
        }

        not_found()
    }

    /// 본문을 읽어 스키마 검증을 거친 뒤 정화된 페이로드를 돌려줍니다.
    async fn handle_api_request(&self, route: &ApiRoute, req: hyper::Request<Incoming>) -> Response {
        let body = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!(route = route.name, error = %e, "본문 읽기 실패");
                return bad_request("Invalid request body");
            }
        };

        // 파서 내부 사정은 클라이언트에 노출하지 않음
        let value: Value = match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(_) => return bad_request("Request body must be valid JSON"),
        };
        let Some(data) = value.as_object() else {
            return bad_request("Request body must be a JSON object");
        };

        let result = validate(data, &route.schema, &ValidationOptions::default());
        if !result.is_valid {
            debug!(route = route.name, errors = ?result.errors, "페이로드 검증 실패");
            return json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "Validation failed",
                    "details": result.errors,
                }),
            );
        }

        json_response(
            StatusCode::OK,
            serde_json::json!({
                "status": "accepted",
                "data": result.sanitized_data,
            }),
        )
    }

    pub async fn handle_connection<I>(
        &self,
        io: I,
    ) -> std::result::Result<(), Box<dyn std::error::Error>>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(io, service_fn(|req| self.handle_request(req)))
            .await
            .map_err(|e| e.into())
    }
}

fn json_response(status: StatusCode, body: Value) -> Response {
    hyper::Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| {
            hyper::Response::new(Full::new(Bytes::from("Internal Server Error")))
        })
}

fn bad_request(message: &str) -> Response {
    json_response(
        StatusCode::BAD_REQUEST,
        serde_json::json!({ "error": message }),
    )
}

fn not_found() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        serde_json::json!({ "error": "Not found" }),
    )
}
