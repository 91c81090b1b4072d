use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::patterns::Pattern;

/// 필드에 기대하는 값의 타입
///
/// `Number`는 엄격한 타입 검사가 아니라 숫자로 변환 가능한지 검사합니다
/// (숫자 문자열 허용). `Email`/`Url`/`Uuid`는 내장 패턴 검사입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Email,
    Url,
    Uuid,
}

/// 이름으로 참조되는 커스텀 검증 규칙
///
/// 문자열 디스패치 대신 열거형을 쓰므로 설정 파일의 오타는
/// 역직렬화 시점에 오류가 됩니다. 조용히 통과하는 규칙은 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomRule {
    ValidateUsername,
    ValidatePassword,
    ValidateAlphanumeric,
    ValidatePositiveNumber,
    ValidateInteger,
}

impl CustomRule {
    /// 규칙을 적용합니다. 유효하면 `None`, 아니면 오류 메시지를 반환합니다.
    pub fn apply(&self, value: &Value, field: &str) -> Option<String> {
        match self {
            CustomRule::ValidateUsername => {
                if value.as_str().map(|s| Pattern::Username.matches(s)).unwrap_or(false) {
                    None
                } else {
                    Some(format!(
                        "{} must be 3-20 characters (letters, numbers, underscore, hyphen)",
                        field
                    ))
                }
            }
            CustomRule::ValidatePassword => {
                if value.as_str().map(|s| Pattern::Password.matches(s)).unwrap_or(false) {
                    None
                } else {
                    Some(format!(
                        "{} must be at least 12 characters with uppercase, lowercase, number and special character",
                        field
                    ))
                }
            }
            CustomRule::ValidateAlphanumeric => {
                if value.as_str().map(|s| Pattern::Alphanumeric.matches(s)).unwrap_or(false) {
                    None
                } else {
                    Some(format!("{} must contain only letters and numbers", field))
                }
            }
            CustomRule::ValidatePositiveNumber => match coerce_f64(value) {
                Some(n) if n > 0.0 => None,
                _ => Some(format!("{} must be a positive number", field)),
            },
            CustomRule::ValidateInteger => match coerce_f64(value) {
                Some(n) if n.fract() == 0.0 => None,
                _ => Some(format!("{} must be an integer", field)),
            },
        }
    }
}

/// 값을 f64로 변환합니다. JSON 숫자와 숫자 문자열만 허용합니다.
pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// 한 필드에 적용되는 선언적 검증 규칙
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationRule {
    /// 필수 여부
    pub required: bool,

    /// 문자열 최소 길이
    pub min_length: Option<usize>,

    /// 문자열 최대 길이 (정화 시 이 길이로 잘림)
    pub max_length: Option<usize>,

    /// 내장 패턴 이름 또는 리터럴 정규식
    pub pattern: Option<String>,

    /// 기대 타입
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,

    /// 허용되는 리터럴 값 목록
    #[serde(rename = "enum")]
    pub allowed_values: Option<Vec<String>>,

    /// 커스텀 검증 규칙
    pub custom: Option<CustomRule>,
}

/// 필드 이름 → 규칙 매핑. 검증 호출 동안 불변입니다.
pub type ValidationSchema = HashMap<String, ValidationRule>;
