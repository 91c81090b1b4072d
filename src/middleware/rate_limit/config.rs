use serde::{Deserialize, Serialize};

/// Rate Limit 설정
///
/// 프로세스 시작 시 한 번 구성되고 이후에는 읽기 전용으로 취급됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// 활성화 여부. 꺼져 있으면 저장소를 전혀 건드리지 않는 완전한 우회입니다.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 윈도우당 최대 요청 수
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// 윈도우 길이 (밀리초)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100 // 기본값: 윈도우당 100 요청
}

fn default_window_ms() -> u64 {
    60_000 // 기본값: 1분
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.max_requests == 0 {
            return Err("max_requests는 0이 될 수 없습니다".to_string());
        }
        if self.enabled && self.window_ms == 0 {
            return Err("window_ms는 0이 될 수 없습니다".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.window_ms, 60_000);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            enabled = true
            max_requests = 30
            window_ms = 1000
        "#;

        let config: RateLimitConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_requests, 30);
        assert_eq!(config.window_ms, 1000);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = RateLimitConfig {
            enabled: true,
            max_requests: 0,
            window_ms: 1000,
        };
        assert!(config.validate().is_err());

        // 비활성화 상태에서는 값이 검사되지 않음
        let config = RateLimitConfig {
            enabled: false,
            max_requests: 0,
            window_ms: 0,
        };
        assert!(config.validate().is_ok());
    }
}
