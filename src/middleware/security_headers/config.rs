use serde::{Deserialize, Serialize};

/// 기능별로 전부 거부되는 Permissions-Policy 대상 목록
///
/// 보수적 기본값입니다. 특정 페이지가 기능을 필요로 하면 그 기능만
/// 명시적으로 완화해야 합니다.
const DENIED_FEATURES: &[&str] = &[
    "accelerometer",
    "ambient-light-sensor",
    "autoplay",
    "battery",
    "camera",
    "display-capture",
    "document-domain",
    "encrypted-media",
    "fullscreen",
    "geolocation",
    "gyroscope",
    "magnetometer",
    "microphone",
    "midi",
    "payment",
    "picture-in-picture",
    "publickey-credentials-get",
    "screen-wake-lock",
    "sync-xhr",
    "usb",
    "web-share",
    "xr-spatial-tracking",
];

/// CSP 지시어 하나
///
/// 소스 토큰이 없는 지시어(예: `upgrade-insecure-requests`)는
/// 키워드만으로 출력됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CspDirective {
    pub name: String,

    #[serde(default)]
    pub sources: Vec<String>,
}

impl CspDirective {
    fn new(name: &str, sources: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 보안 응답 헤더 설정
///
/// 프로세스 시작 시 한 번 구성되고 이후에는 읽기 전용으로 취급됩니다.
/// 기본값은 커뮤니티 사이트 배포 기준선입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityHeadersConfig {
    #[serde(default = "default_true")]
    pub enable_csp: bool,

    /// CSP 지시어 목록. 순서가 그대로 헤더 출력 순서가 됩니다.
    #[serde(default = "default_csp_directives")]
    pub csp_directives: Vec<CspDirective>,

    #[serde(default = "default_true")]
    pub enable_hsts: bool,

    /// HSTS max-age (초)
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age: u64,

    #[serde(default = "default_true")]
    pub hsts_include_subdomains: bool,

    #[serde(default)]
    pub hsts_preload: bool,

    #[serde(default = "default_true")]
    pub enable_frame_options: bool,

    #[serde(default = "default_true")]
    pub enable_content_type_options: bool,

    #[serde(default = "default_true")]
    pub enable_referrer_policy: bool,

    #[serde(default = "default_true")]
    pub enable_permissions_policy: bool,
}

fn default_true() -> bool {
    true
}

fn default_hsts_max_age() -> u64 {
    31_536_000 // 1년
}

fn default_csp_directives() -> Vec<CspDirective> {
    vec![
        CspDirective::new("default-src", &["'self'"]),
        CspDirective::new(
            "script-src",
            &[
                "'self'",
                "'unsafe-inline'",
                "'unsafe-eval'",
                "https://cdn.jsdelivr.net",
                "https://unpkg.com",
            ],
        ),
        CspDirective::new(
            "style-src",
            &["'self'", "'unsafe-inline'", "https://fonts.googleapis.com"],
        ),
        CspDirective::new("font-src", &["'self'", "https://fonts.gstatic.com", "data:"]),
        CspDirective::new("img-src", &["'self'", "data:", "https:", "blob:"]),
        CspDirective::new("media-src", &["'self'", "data:", "https:", "blob:"]),
        CspDirective::new(
            "connect-src",
            &[
                "'self'",
                "https://*.supabase.co",
                "wss://*.supabase.co",
                "https://api.github.com",
            ],
        ),
        CspDirective::new("frame-src", &["'self'"]),
        CspDirective::new("frame-ancestors", &["'self'"]),
        CspDirective::new("base-uri", &["'self'"]),
        CspDirective::new("form-action", &["'self'"]),
        CspDirective::new("object-src", &["'none'"]),
        CspDirective::new("upgrade-insecure-requests", &[]),
    ]
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enable_csp: true,
            csp_directives: default_csp_directives(),
            enable_hsts: true,
            hsts_max_age: default_hsts_max_age(),
            hsts_include_subdomains: true,
            hsts_preload: false,
            enable_frame_options: true,
            enable_content_type_options: true,
            enable_referrer_policy: true,
            enable_permissions_policy: true,
        }
    }
}

impl SecurityHeadersConfig {
    /// Content-Security-Policy 헤더 값을 조립합니다.
    pub fn csp_header(&self) -> String {
        self.csp_directives
            .iter()
            .map(|directive| {
                if directive.sources.is_empty() {
                    directive.name.clone()
                } else {
                    format!("{} {}", directive.name, directive.sources.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Strict-Transport-Security 헤더 값을 조립합니다.
    pub fn hsts_header(&self) -> String {
        let mut value = format!("max-age={}", self.hsts_max_age);
        if self.hsts_include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.hsts_preload {
            value.push_str("; preload");
        }
        value
    }

    /// Permissions-Policy 헤더 값을 조립합니다. 목록의 모든 기능이 거부됩니다.
    pub fn permissions_policy_header() -> String {
        DENIED_FEATURES
            .iter()
            .map(|feature| format!("{}=()", feature))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 스킴이 있는 CSP 소스 토큰의 구문을 검사합니다.
    ///
    /// 와일드카드 호스트(`https://*.example.com`)는 URL로 파싱되지 않으므로
    /// 구문 검사에서 제외합니다.
    pub fn validate(&self) -> Result<(), String> {
        for directive in &self.csp_directives {
            for source in &directive.sources {
                let schemed =
                    source.starts_with("http://") || source.starts_with("https://");
                if schemed && !source.contains('*') {
                    url::Url::parse(source).map_err(|e| {
                        format!(
                            "{} 지시어의 소스 '{}'가 URL이 아닙니다: {}",
                            directive.name, source, e
                        )
                    })?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_csp_is_deterministic() {
        let config = SecurityHeadersConfig::default();
        assert_eq!(config.csp_header(), config.csp_header());
        assert_eq!(
            SecurityHeadersConfig::default().csp_header(),
            config.csp_header()
        );
    }

    #[test]
    fn test_default_csp_baseline() {
        let csp = SecurityHeadersConfig::default().csp_header();
        assert!(csp.starts_with("default-src 'self'; "));
        assert!(csp.contains(
            "script-src 'self' 'unsafe-inline' 'unsafe-eval' https://cdn.jsdelivr.net https://unpkg.com"
        ));
        assert!(csp.contains(
            "connect-src 'self' https://*.supabase.co wss://*.supabase.co https://api.github.com"
        ));
        assert!(csp.contains("object-src 'none'"));
        // 토큰 없는 지시어는 키워드만
        assert!(csp.ends_with("upgrade-insecure-requests"));
        assert!(!csp.contains("upgrade-insecure-requests "));
    }

    #[test]
    fn test_hsts_header_variants() {
        let config = SecurityHeadersConfig::default();
        assert_eq!(config.hsts_header(), "max-age=31536000; includeSubDomains");

        let config = SecurityHeadersConfig {
            hsts_include_subdomains: false,
            ..Default::default()
        };
        assert_eq!(config.hsts_header(), "max-age=31536000");

        let config = SecurityHeadersConfig {
            hsts_preload: true,
            ..Default::default()
        };
        assert_eq!(
            config.hsts_header(),
            "max-age=31536000; includeSubDomains; preload"
        );
    }

    #[test]
    fn test_permissions_policy_denies_everything() {
        let policy = SecurityHeadersConfig::permissions_policy_header();
        for feature in ["camera", "microphone", "geolocation", "payment", "usb"] {
            assert!(policy.contains(&format!("{}=()", feature)));
        }
        assert!(!policy.contains("=(self)"));
    }

    #[test]
    fn test_validate_rejects_malformed_origin() {
        let mut config = SecurityHeadersConfig::default();
        assert!(config.validate().is_ok());

        config.csp_directives.push(CspDirective::new(
            "script-src",
            &["https://bad origin.example.com"],
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            enable_hsts = false
            hsts_max_age = 86400

            [[csp_directives]]
            name = "default-src"
            sources = ["'self'"]
        "#;

        let config: SecurityHeadersConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.enable_hsts);
        assert_eq!(config.hsts_max_age, 86400);
        assert_eq!(config.csp_directives.len(), 1);
        assert_eq!(config.csp_header(), "default-src 'self'");
    }
}
