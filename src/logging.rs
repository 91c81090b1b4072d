use std::path::Path;
use tracing::{error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

use crate::settings::{LogFormat, LogOutput, LogSettings};

/// 로깅을 초기화합니다.
///
/// 파일 출력일 때 반환되는 guard는 프로세스가 끝날 때까지 유지해야
/// 버퍼가 유실되지 않습니다.
pub fn init_logging(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(settings.level.into());

    match &settings.output {
        LogOutput::Stdout => {
            match settings.format {
                LogFormat::Text => {
                    tracing_subscriber::fmt()
                        .with_env_filter(filter)
                        .with_target(true)
                        .init();
                }
                LogFormat::Json => {
                    tracing_subscriber::fmt()
                        .json()
                        .with_timer(UtcTime::rfc_3339())
                        .with_env_filter(filter)
                        .with_target(true)
                        .init();
                }
            }
            None
        }
        LogOutput::File(path) => {
            let path = Path::new(path);
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "gateway.log".to_string());

            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            match settings.format {
                LogFormat::Text => {
                    tracing_subscriber::fmt()
                        .with_env_filter(filter)
                        .with_writer(writer)
                        .with_ansi(false)
                        .init();
                }
                LogFormat::Json => {
                    tracing_subscriber::fmt()
                        .json()
                        .with_timer(UtcTime::rfc_3339())
                        .with_env_filter(filter)
                        .with_writer(writer)
                        .init();
                }
            }
            Some(guard)
        }
    }
}

/// 요청 하나에 대한 접근 로그 레코드
#[derive(Debug)]
pub struct RequestLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub client_id: String,
    pub status_code: u16,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl RequestLog {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            method: String::new(),
            path: String::new(),
            client_id: String::new(),
            status_code: 0,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn with_request<B>(&mut self, req: &hyper::Request<B>, client_id: &str) {
        self.method = req.method().to_string();
        self.path = req.uri().path().to_string();
        self.client_id = client_id.to_string();
    }

    pub fn with_response(&mut self, status: hyper::StatusCode) {
        self.status_code = status.as_u16();
    }

    pub fn with_error(&mut self, error: impl std::fmt::Display) {
        self.error = Some(error.to_string());
    }
}

/// 상태 코드 등급에 따라 레벨을 골라 접근 로그를 남깁니다.
pub fn log_request(log: &RequestLog) {
    let level = if log.error.is_some() {
        Level::ERROR
    } else if log.status_code >= 400 {
        Level::WARN
    } else {
        Level::INFO
    };

    match level {
        Level::ERROR => error!(
            request_id = %log.request_id,
            method = %log.method,
            path = %log.path,
            client_id = %log.client_id,
            status = log.status_code,
            duration_ms = log.duration_ms,
            error = ?log.error,
            "요청 처리 실패"
        ),
        Level::WARN => warn!(
            request_id = %log.request_id,
            method = %log.method,
            path = %log.path,
            client_id = %log.client_id,
            status = log.status_code,
            duration_ms = log.duration_ms,
            "요청 거부됨"
        ),
        _ => info!(
            request_id = %log.request_id,
            method = %log.method,
            path = %log.path,
            client_id = %log.client_id,
            status = log.status_code,
            duration_ms = log.duration_ms,
            "요청 처리 완료"
        ),
    }
}
