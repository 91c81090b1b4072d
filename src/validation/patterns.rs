use std::sync::OnceLock;
use regex_lite as regex;

/// 비밀번호에 허용되는 특수 문자 집합
const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// 비밀번호 최소 길이
const PASSWORD_MIN_LENGTH: usize = 12;

/// 필드 검증에 사용되는 내장 패턴 레지스트리
///
/// 스키마에서 이름으로 참조되며, 알 수 없는 이름은 `from_name`에서
/// `None`으로 드러나므로 호출 측이 리터럴 정규식으로 처리합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Email,
    Url,
    Uuid,
    Username,
    Password,
    Alphanumeric,
    Numeric,
    Decimal,
}

impl Pattern {
    /// 스키마에서 사용하는 패턴 이름으로 패턴을 찾습니다.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "email" => Some(Pattern::Email),
            "url" => Some(Pattern::Url),
            "uuid" => Some(Pattern::Uuid),
            "username" => Some(Pattern::Username),
            "password" => Some(Pattern::Password),
            "alphanumeric" => Some(Pattern::Alphanumeric),
            "numeric" => Some(Pattern::Numeric),
            "decimal" => Some(Pattern::Decimal),
            _ => None,
        }
    }

    /// 패턴의 스키마 이름을 반환합니다.
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Email => "email",
            Pattern::Url => "url",
            Pattern::Uuid => "uuid",
            Pattern::Username => "username",
            Pattern::Password => "password",
            Pattern::Alphanumeric => "alphanumeric",
            Pattern::Numeric => "numeric",
            Pattern::Decimal => "decimal",
        }
    }

    /// 값이 패턴과 일치하는지 검사합니다.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Email => email_regex().is_match(value),
            Pattern::Url => url_regex().is_match(value),
            Pattern::Uuid => uuid_regex().is_match(value),
            Pattern::Username => username_regex().is_match(value),
            // regex 계열 크레이트는 look-around를 지원하지 않으므로
            // 비밀번호 강도는 범주별 검사로 분해
            Pattern::Password => password_matches(value),
            Pattern::Alphanumeric => alphanumeric_regex().is_match(value),
            Pattern::Numeric => numeric_regex().is_match(value),
            Pattern::Decimal => decimal_regex().is_match(value),
        }
    }
}

fn compile(pattern: &str) -> regex::Regex {
    regex::Regex::new(pattern).expect("invalid built-in pattern")
}

fn email_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"))
}

fn url_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^https?://\S+$"))
}

fn uuid_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$")
    })
}

fn username_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^[a-zA-Z0-9_-]{3,20}$"))
}

fn alphanumeric_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^[a-zA-Z0-9]+$"))
}

fn numeric_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^[0-9]+$"))
}

fn decimal_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^[0-9]+(\.[0-9]+)?$"))
}

/// 비밀번호 강도 검사
///
/// 12자 이상, 소문자/대문자/숫자 각 1개 이상, 특수 문자(`@$!%*?&`) 1개 이상.
fn password_matches(value: &str) -> bool {
    value.chars().count() >= PASSWORD_MIN_LENGTH
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}
