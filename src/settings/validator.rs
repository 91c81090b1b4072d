use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::debug;

use super::error::SettingsError;
use super::Result;

/// JSON 설정 검증을 위한 구조체
pub struct JsonConfigValidator {
    schema: JSONSchema,
}

/// 검증 오류 타입
#[derive(Debug)]
pub enum ValidationError {
    ParseError(String),
    SchemaError { path: String, message: String },
}

impl JsonConfigValidator {
    /// 새 validator 인스턴스 생성
    pub fn new() -> Result<Self> {
        // 내장 JSON 스키마 정의
        let schema_str = r#"{
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["version"],
            "properties": {
                "version": {
                    "type": "string",
                    "enum": ["1.0"]
                },
                "server": {
                    "type": "object",
                    "properties": {
                        "http_port": {"type": "integer", "minimum": 1, "maximum": 65535},
                        "bind_address": {"type": "string"}
                    }
                },
                "logging": {
                    "type": "object",
                    "properties": {
                        "format": {"type": "string", "enum": ["text", "json"]},
                        "level": {"type": "string", "enum": ["error", "warn", "info", "debug", "trace"]},
                        "output": {"type": "string"}
                    }
                },
                "security": {
                    "type": "object",
                    "properties": {
                        "enable_csp": {"type": "boolean"},
                        "csp_directives": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["name"],
                                "properties": {
                                    "name": {"type": "string"},
                                    "sources": {
                                        "type": "array",
                                        "items": {"type": "string"}
                                    }
                                }
                            }
                        },
                        "enable_hsts": {"type": "boolean"},
                        "hsts_max_age": {"type": "integer", "minimum": 0},
                        "hsts_include_subdomains": {"type": "boolean"},
                        "hsts_preload": {"type": "boolean"},
                        "enable_frame_options": {"type": "boolean"},
                        "enable_content_type_options": {"type": "boolean"},
                        "enable_referrer_policy": {"type": "boolean"},
                        "enable_permissions_policy": {"type": "boolean"}
                    }
                },
                "rate_limit": {
                    "type": "object",
                    "properties": {
                        "enabled": {"type": "boolean"},
                        "max_requests": {"type": "integer", "minimum": 0},
                        "window_ms": {"type": "integer", "minimum": 0}
                    }
                }
            }
        }"#;

        // 스키마 컴파일
        let schema_value: Value = serde_json::from_str(schema_str)
            .map_err(|e| SettingsError::SchemaCompileError {
                reason: format!("스키마 파싱 오류: {}", e),
            })?;

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_value)
            .map_err(|e| SettingsError::SchemaCompileError {
                reason: format!("스키마 컴파일 오류: {}", e),
            })?;

        debug!("설정 JSON 스키마 컴파일 성공");
        Ok(Self { schema })
    }

    /// JSON 문자열 유효성 검사
    pub fn validate(&self, json_str: &str) -> std::result::Result<Value, Vec<ValidationError>> {
        // JSON 파싱
        let value = match serde_json::from_str::<Value>(json_str) {
            Ok(v) => v,
            Err(e) => {
                return Err(vec![ValidationError::ParseError(e.to_string())]);
            }
        };

        // 스키마 검증
        if let Err(errors) = self.schema.validate(&value) {
            let validation_errors = errors
                .map(|error| ValidationError::SchemaError {
                    path: error.instance_path.to_string(),
                    message: error.to_string(),
                })
                .collect::<Vec<_>>();

            return Err(validation_errors);
        }

        Ok(value)
    }
}

impl From<Vec<ValidationError>> for SettingsError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let formatted_errors = errors
            .iter()
            .map(|e| match e {
                ValidationError::ParseError(msg) => format!("파싱 오류: {}", msg),
                ValidationError::SchemaError { path, message } =>
                    format!("스키마 오류 (경로: {}): {}", path, message),
            })
            .collect();

        SettingsError::ValidationErrors {
            errors: formatted_errors,
            file: "gateway.json".to_string(), // 기본값, 실제 경로는 호출 측에서 알려짐
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_basic_json() {
        let validator = JsonConfigValidator::new().unwrap();

        let json = r#"{
            "version": "1.0"
        }"#;
        assert!(validator.validate(json).is_ok());

        // 필수 version 필드 누락
        let invalid_json = r#"{
            "server": { "http_port": 8080 }
        }"#;
        assert!(validator.validate(invalid_json).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_types() {
        let validator = JsonConfigValidator::new().unwrap();

        let json = r#"{
            "version": "1.0",
            "rate_limit": { "max_requests": "many" }
        }"#;
        assert!(validator.validate(json).is_err());

        let json = r#"{
            "version": "1.0",
            "security": { "csp_directives": [ { "sources": ["'self'"] } ] }
        }"#;
        // name이 빠진 지시어는 거부
        assert!(validator.validate(json).is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_json() {
        let validator = JsonConfigValidator::new().unwrap();
        let result = validator.validate("{ not json");
        assert!(matches!(
            result.unwrap_err().as_slice(),
            [ValidationError::ParseError(_)]
        ));
    }
}
