use std::{env, fs, path::Path};
use serde::Deserialize;
use tracing::debug;

use crate::middleware::rate_limit::RateLimitConfig;
use crate::middleware::security_headers::SecurityHeadersConfig;

mod error;
mod json;
pub mod logging;
mod server;
mod validator;

pub use error::SettingsError;
pub use json::JsonConfig;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use server::{parse_env_var, ServerSettings};
pub use validator::{JsonConfigValidator, ValidationError};

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    /// 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 보안 응답 헤더 설정
    #[serde(default)]
    pub security: SecurityHeadersConfig,

    /// Rate limit 설정
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Settings {
    /// 설정을 로드합니다.
    ///
    /// `GATEWAY_CONFIG_FILE`이 가리키는 TOML/JSON 파일을 우선하고,
    /// 없으면 환경 변수에서 읽습니다. 로드된 설정은 즉시 검증되며
    /// 이후에는 읽기 전용으로 취급됩니다.
    pub async fn load() -> Result<Self> {
        let settings = if let Ok(config_path) = env::var("GATEWAY_CONFIG_FILE") {
            if config_path.ends_with(".json") {
                Self::from_json_file(&config_path).await?
            } else {
                Self::from_toml_file(&config_path)?
            }
        } else {
            Self::from_env()?
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("TOML 설정 파일 로드: {}", path.as_ref().display());
        let content = fs::read_to_string(&path).map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        Ok(settings)
    }

    pub async fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = JsonConfig::from_file(path).await?;
        Ok(config.into_settings())
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            // 보안 헤더는 환경 변수로 조각내기엔 구조적이라 기본 기준선 사용
            security: SecurityHeadersConfig::default(),
            rate_limit: RateLimitConfig {
                enabled: parse_env_var("GATEWAY_RATE_LIMIT_ENABLED", || true)?,
                max_requests: parse_env_var("GATEWAY_RATE_LIMIT_MAX", || {
                    RateLimitConfig::default().max_requests
                })?,
                window_ms: parse_env_var("GATEWAY_RATE_LIMIT_WINDOW_MS", || {
                    RateLimitConfig::default().window_ms
                })?,
            },
        })
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.rate_limit
            .validate()
            .map_err(SettingsError::InvalidConfig)?;
        self.security
            .validate()
            .map_err(SettingsError::InvalidConfig)?;
        Ok(())
    }
}
