use std::collections::HashMap;
use regex_lite as regex;
use serde_json::{Map, Value};
use tracing::warn;

use super::patterns::Pattern;
use super::rule::{coerce_f64, FieldType, ValidationRule, ValidationSchema};
use super::sanitize::sanitize_value;

/// 스키마에 없는 필드에 대한 오류가 수집되는 예약 키
pub const UNKNOWN_FIELDS_KEY: &str = "_unknown";

/// 검증 동작 옵션
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// 스키마에 없는 필드를 거부할지 여부
    pub strict: bool,

    /// 스키마에 없는 필드를 허용할지 여부 (strict보다 우선)
    pub allow_unknown: bool,

    /// 통과한 값을 정화할지 여부
    pub sanitize: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strict: true,
            allow_unknown: false,
            sanitize: true,
        }
    }
}

/// 검증 결과
///
/// `is_valid`는 `errors`가 비어 있을 때만 true입니다. `sanitized_data`에는
/// 오류가 하나도 없는 필드만 들어갑니다.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: HashMap<String, Vec<String>>,
    pub sanitized_data: Map<String, Value>,
}

/// 신뢰할 수 없는 입력 레코드를 스키마에 대해 검증합니다.
///
/// 실패는 데이터로 반환되며 절대 패닉하거나 Err를 돌려주지 않습니다.
/// 각 필드의 오류는 독립적으로 누적되므로 호출자는 위반 사항 전체를
/// 한 번에 제시할 수 있습니다.
pub fn validate(
    data: &Map<String, Value>,
    schema: &ValidationSchema,
    options: &ValidationOptions,
) -> ValidationResult {
    let mut errors: HashMap<String, Vec<String>> = HashMap::new();
    let mut sanitized = Map::new();

    if options.strict && !options.allow_unknown {
        let mut unknown: Vec<&str> = data
            .keys()
            .filter(|key| !schema.contains_key(key.as_str()))
            .map(|key| key.as_str())
            .collect();

        if !unknown.is_empty() {
            // 필드별이 아니라 예약 키 하나로 모아서 보고
            unknown.sort_unstable();
            errors.insert(
                UNKNOWN_FIELDS_KEY.to_string(),
                vec![format!("Unknown fields: {}", unknown.join(", "))],
            );
        }
    }

    for (field, rule) in schema {
        let raw = data.get(field);
        let mut field_errors = Vec::new();

        if is_empty(raw) {
            if rule.required {
                field_errors.push(format!("{} is required", field));
            } else {
                // 비어 있는 선택 필드는 나머지 검사를 건너뛰고 그대로 통과
                if let Some(value) = raw {
                    sanitized.insert(field.clone(), value.clone());
                }
                continue;
            }
        }

        let value = raw.unwrap_or(&Value::Null);

        check_type(field, rule, value, &mut field_errors);
        check_length(field, rule, value, &mut field_errors);
        check_pattern(field, rule, value, &mut field_errors);
        check_enum(field, rule, value, &mut field_errors);

        if let Some(custom) = rule.custom {
            if let Some(message) = custom.apply(value, field) {
                field_errors.push(message);
            }
        }

        if field_errors.is_empty() {
            let output = if options.sanitize {
                sanitize_value(value, rule)
            } else {
                value.clone()
            };
            sanitized.insert(field.clone(), output);
        } else {
            errors.insert(field.clone(), field_errors);
        }
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        sanitized_data: sanitized,
    }
}

/// 누락, null, 빈 문자열을 빈 값으로 취급합니다.
fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn check_type(field: &str, rule: &ValidationRule, value: &Value, errors: &mut Vec<String>) {
    let Some(field_type) = rule.field_type else {
        return;
    };

    let ok = match field_type {
        FieldType::String => value.is_string(),
        FieldType::Number => coerce_f64(value).is_some(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Email => value.as_str().map(|s| Pattern::Email.matches(s)).unwrap_or(false),
        FieldType::Url => value.as_str().map(|s| Pattern::Url.matches(s)).unwrap_or(false),
        FieldType::Uuid => value.as_str().map(|s| Pattern::Uuid.matches(s)).unwrap_or(false),
    };

    if !ok {
        let expected = match field_type {
            FieldType::String => "must be a string",
            FieldType::Number => "must be a number",
            FieldType::Boolean => "must be a boolean",
            FieldType::Email => "must be a valid email address",
            FieldType::Url => "must be a valid URL",
            FieldType::Uuid => "must be a valid UUID",
        };
        errors.push(format!("{} {}", field, expected));
    }
}

/// 길이 검사는 런타임 값이 문자열일 때만 적용됩니다.
fn check_length(field: &str, rule: &ValidationRule, value: &Value, errors: &mut Vec<String>) {
    let Some(s) = value.as_str() else {
        return;
    };
    let length = s.chars().count();

    if let Some(min) = rule.min_length {
        if length < min {
            errors.push(format!("{} must be at least {} characters", field, min));
        }
    }
    if let Some(max) = rule.max_length {
        if length > max {
            errors.push(format!("{} must be at most {} characters", field, max));
        }
    }
}

fn check_pattern(field: &str, rule: &ValidationRule, value: &Value, errors: &mut Vec<String>) {
    let Some(pattern) = rule.pattern.as_deref() else {
        return;
    };
    let text = value_to_string(value);

    // 내장 패턴 이름을 먼저 찾고, 없으면 리터럴 정규식으로 컴파일
    let matched = match Pattern::from_name(pattern) {
        Some(named) => named.matches(&text),
        None => match regex::Regex::new(pattern) {
            Ok(re) => re.is_match(&text),
            Err(e) => {
                // 컴파일되지 않는 패턴은 통과가 아니라 거부
                warn!(field = %field, pattern = %pattern, error = %e, "리터럴 패턴 컴파일 실패");
                false
            }
        },
    };

    if !matched {
        errors.push(format!("{} format is invalid", field));
    }
}

fn check_enum(field: &str, rule: &ValidationRule, value: &Value, errors: &mut Vec<String>) {
    let Some(allowed) = rule.allowed_values.as_ref() else {
        return;
    };
    let text = value_to_string(value);

    if !allowed.iter().any(|candidate| candidate == &text) {
        errors.push(format!("{} must be one of: {}", field, allowed.join(", ")));
    }
}

/// 패턴/열거형 검사에 쓰이는 값의 문자열 형태
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_required_field_accumulates_multiple_errors() {
        let schema = ValidationSchema::from([(
            "email".to_string(),
            ValidationRule {
                required: true,
                field_type: Some(FieldType::Email),
                ..Default::default()
            },
        )]);

        let result = validate(&object(json!({})), &schema, &ValidationOptions::default());
        assert!(!result.is_valid);

        // required와 타입 검사가 모두 보고됨
        let errors = &result.errors["email"];
        assert!(errors.iter().any(|e| e.contains("required")));
        assert!(errors.iter().any(|e| e.contains("valid email")));
        assert!(!result.sanitized_data.contains_key("email"));
    }

    #[test]
    fn test_optional_empty_field_passes_through() {
        let schema = ValidationSchema::from([(
            "bio".to_string(),
            ValidationRule {
                max_length: Some(10),
                ..Default::default()
            },
        )]);

        let result = validate(
            &object(json!({ "bio": "" })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(result.is_valid);
        assert_eq!(result.sanitized_data.get("bio"), Some(&json!("")));

        // 아예 누락된 경우에는 출력에도 나타나지 않음
        let result = validate(&object(json!({})), &schema, &ValidationOptions::default());
        assert!(result.is_valid);
        assert!(!result.sanitized_data.contains_key("bio"));
    }

    #[test]
    fn test_unknown_fields_collected_under_reserved_key() {
        let schema = ValidationSchema::from([(
            "title".to_string(),
            ValidationRule::default(),
        )]);

        let result = validate(
            &object(json!({ "title": "hi", "griefing": 1, "xray": 2 })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(!result.is_valid);
        assert_eq!(
            result.errors[UNKNOWN_FIELDS_KEY],
            vec!["Unknown fields: griefing, xray".to_string()]
        );

        // allow_unknown이면 같은 입력이 통과
        let relaxed = ValidationOptions {
            allow_unknown: true,
            ..Default::default()
        };
        let result = validate(
            &object(json!({ "title": "hi", "griefing": 1 })),
            &schema,
            &relaxed,
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_numeric_string_passes_number_type() {
        let schema = ValidationSchema::from([(
            "file_size".to_string(),
            ValidationRule {
                required: true,
                field_type: Some(FieldType::Number),
                ..Default::default()
            },
        )]);

        let result = validate(
            &object(json!({ "file_size": "2048" })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(result.is_valid);
        // 정화 단계에서 숫자로 강제 변환됨
        assert_eq!(result.sanitized_data.get("file_size"), Some(&json!(2048)));

        let result = validate(
            &object(json!({ "file_size": true })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn test_length_violation_reported_before_truncation() {
        let schema = ValidationSchema::from([(
            "title".to_string(),
            ValidationRule {
                required: true,
                max_length: Some(5),
                ..Default::default()
            },
        )]);

        // 정화 절단은 통과한 값에만 적용되므로 초과 길이는 오류로 보고
        let result = validate(
            &object(json!({ "title": "obsidian" })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(!result.is_valid);
        assert!(result.errors["title"][0].contains("at most 5"));
        assert!(!result.sanitized_data.contains_key("title"));
    }

    #[test]
    fn test_literal_pattern_and_named_pattern() {
        let schema = ValidationSchema::from([
            (
                "username".to_string(),
                ValidationRule {
                    required: true,
                    pattern: Some("username".to_string()),
                    ..Default::default()
                },
            ),
            (
                "server_code".to_string(),
                ValidationRule {
                    required: true,
                    pattern: Some(r"^[A-Z]{3}-[0-9]{4}$".to_string()),
                    ..Default::default()
                },
            ),
        ]);

        let result = validate(
            &object(json!({ "username": "Notch", "server_code": "SMP-0042" })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(result.is_valid);

        let result = validate(
            &object(json!({ "username": "no spaces", "server_code": "smp-42" })),
            &schema,
            &ValidationOptions::default(),
        );
        assert_eq!(result.errors["username"], vec!["username format is invalid"]);
        assert_eq!(result.errors["server_code"], vec!["server_code format is invalid"]);
    }

    #[test]
    fn test_uncompilable_literal_pattern_fails_closed() {
        let schema = ValidationSchema::from([(
            "code".to_string(),
            ValidationRule {
                required: true,
                pattern: Some("[unclosed".to_string()),
                ..Default::default()
            },
        )]);

        let result = validate(
            &object(json!({ "code": "anything" })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn test_enum_check_uses_string_form() {
        let schema = ValidationSchema::from([(
            "rank".to_string(),
            ValidationRule {
                required: true,
                allowed_values: Some(vec![
                    "member".to_string(),
                    "moderator".to_string(),
                    "admin".to_string(),
                ]),
                ..Default::default()
            },
        )]);

        let result = validate(
            &object(json!({ "rank": "owner" })),
            &schema,
            &ValidationOptions::default(),
        );
        assert_eq!(
            result.errors["rank"],
            vec!["rank must be one of: member, moderator, admin"]
        );

        let result = validate(
            &object(json!({ "rank": "moderator" })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_sanitize_disabled_keeps_raw_value() {
        let schema = ValidationSchema::from([(
            "note".to_string(),
            ValidationRule::default(),
        )]);
        let options = ValidationOptions {
            sanitize: false,
            ..Default::default()
        };

        let result = validate(&object(json!({ "note": "  raw  " })), &schema, &options);
        assert!(result.is_valid);
        assert_eq!(result.sanitized_data.get("note"), Some(&json!("  raw  ")));
    }

    #[test]
    fn test_validation_is_idempotent_on_sanitized_output() {
        let schema = ValidationSchema::from([(
            "content".to_string(),
            ValidationRule {
                required: true,
                max_length: Some(50),
                ..Default::default()
            },
        )]);

        let first = validate(
            &object(json!({ "content": "  welcome to the <server>  " })),
            &schema,
            &ValidationOptions::default(),
        );
        assert!(first.is_valid);

        let second = validate(&first.sanitized_data, &schema, &ValidationOptions::default());
        assert!(second.is_valid);
        assert!(second.errors.is_empty());
        assert_eq!(second.sanitized_data, first.sanitized_data);
    }
}
