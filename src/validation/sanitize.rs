use serde_json::{Number, Value};

use super::rule::{coerce_f64, FieldType, ValidationRule};

/// 검증을 통과한 값을 저장 전에 정화합니다.
///
/// 문자열: 앞뒤 공백 제거, 꺾쇠 문자(`<`, `>`) 제거, `maxLength`로 절단.
/// `type = number`: 숫자로 강제 변환. `type = boolean`: truthiness 변환.
/// 그 외 타입은 그대로 통과합니다. 이 정화는 저장 전 보강일 뿐이며
/// 렌더링 시점의 출력 인코딩을 대체하지 않습니다.
pub fn sanitize_value(value: &Value, rule: &ValidationRule) -> Value {
    match rule.field_type {
        Some(FieldType::Number) => coerce_number(value),
        Some(FieldType::Boolean) => Value::Bool(truthy(value)),
        _ => match value {
            Value::String(s) => Value::String(sanitize_string(s, rule.max_length)),
            other => other.clone(),
        },
    }
}

/// 문자열 정화: trim → 꺾쇠 제거 → 절단
pub fn sanitize_string(value: &str, max_length: Option<usize>) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect();

    match max_length {
        // 문자 단위 절단 (바이트 경계가 아니라)
        Some(max) if cleaned.chars().count() > max => cleaned.chars().take(max).collect(),
        _ => cleaned,
    }
}

fn coerce_number(value: &Value) -> Value {
    match coerce_f64(value) {
        Some(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 => {
            Value::Number(Number::from(n as i64))
        }
        Some(n) => Number::from_f64(n).map(Value::Number).unwrap_or_else(|| value.clone()),
        None => value.clone(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
