//! 신뢰할 수 없는 입력 페이로드를 저장 전에 검증/정화하는 모듈입니다.

mod patterns;
mod rule;
mod sanitize;
pub mod schemas;
mod validator;

pub use patterns::Pattern;
pub use rule::{CustomRule, FieldType, ValidationRule, ValidationSchema};
pub use sanitize::{sanitize_string, sanitize_value};
pub use validator::{validate, ValidationOptions, ValidationResult, UNKNOWN_FIELDS_KEY};
