use std::path::Path;
use serde::Deserialize;
use tracing::{debug, info};

use crate::middleware::rate_limit::RateLimitConfig;
use crate::middleware::security_headers::SecurityHeadersConfig;

use super::logging::LogSettings;
use super::server::ServerSettings;
use super::validator::JsonConfigValidator;
use super::{Result, Settings, SettingsError};

/// JSON 배포 설정 파일
///
/// 역직렬화 전에 내장 스키마로 먼저 검증되므로 타입이 어긋난 설정은
/// 구조적인 오류 목록으로 보고됩니다.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonConfig {
    /// 설정 파일 버전 (현재 "1.0"만 지원)
    pub version: String,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub logging: LogSettings,

    #[serde(default)]
    pub security: SecurityHeadersConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl JsonConfig {
    /// JSON 설정 파일을 읽고 스키마 검증 후 역직렬화합니다.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        debug!("JSON 설정 파일 로드: {}", path_ref.display());

        let content = tokio::fs::read_to_string(path_ref).await.map_err(|e| {
            SettingsError::FileError {
                path: path_ref.to_string_lossy().to_string(),
                error: e,
            }
        })?;

        let validator = JsonConfigValidator::new()?;
        let value = validator.validate(&content).map_err(|errors| {
            let mut error = SettingsError::from(errors);
            if let SettingsError::ValidationErrors { file, .. } = &mut error {
                *file = path_ref.to_string_lossy().to_string();
            }
            error
        })?;

        let config: JsonConfig = serde_json::from_value(value).map_err(|e| {
            SettingsError::JsonParseError {
                reason: e.to_string(),
            }
        })?;

        info!("JSON 설정 파일 로드 완료: {}", path_ref.display());
        Ok(config)
    }

    pub fn into_settings(self) -> Settings {
        Settings {
            server: self.server,
            logging: self.logging,
            security: self.security,
            rate_limit: self.rate_limit,
        }
    }
}
