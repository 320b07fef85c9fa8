/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, JWT secret, token TTL, CORS 許可, body limit / timeout など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // base64; None means "generate one" (development only)
    pub jwt_secret_key: Option<String>,
    pub access_token_ttl_seconds: i64,

    pub http_body_limit_bytes: usize,
    pub http_timeout_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret_key", &self.jwt_secret_key.as_ref().map(|_| "<set>"))
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("http_body_limit_bytes", &self.http_body_limit_bytes)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret_key = std::env::var("JWT_SECRET_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        if jwt_secret_key.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("JWT_SECRET_KEY"));
        }

        let access_token_ttl_seconds =
            parse_ttl(std::env::var("ACCESS_TOKEN_TTL_SECONDS").ok().as_deref())?;

        let http_body_limit_bytes = std::env::var("HTTP_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let http_timeout_seconds = std::env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            jwt_secret_key,
            access_token_ttl_seconds,
            http_body_limit_bytes,
            http_timeout_seconds,
        })
    }
}

// Positive, and small enough to be a `chrono::Duration`.
fn parse_ttl(raw: Option<&str>) -> Result<i64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(60 * 60); // 1 hour
    };
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|ttl| *ttl > 0 && chrono::Duration::try_seconds(*ttl).is_some())
        .ok_or(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_accepts_short_production_alias() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn ttl_defaults_to_one_hour() {
        assert_eq!(parse_ttl(None).unwrap(), 3600);
        assert_eq!(parse_ttl(Some("900")).unwrap(), 900);
    }

    #[test]
    fn ttl_must_be_a_positive_representable_duration() {
        let max = i64::MAX.to_string();
        let past_chrono_range = (i64::MAX / 999).to_string();
        for raw in ["0", "-5", "abc", max.as_str(), past_chrono_range.as_str()] {
            assert!(
                matches!(
                    parse_ttl(Some(raw)),
                    Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))
                ),
                "{raw} was accepted"
            );
        }
    }

    #[test]
    fn debug_does_not_print_the_secret() {
        let config = Config {
            addr: "127.0.0.1:3000".parse().unwrap(),
            app_env: AppEnv::Development,
            cors_allowed_origins: vec![],
            jwt_secret_key: Some("c2VjcmV0LXNlY3JldA==".into()),
            access_token_ttl_seconds: 60,
            http_body_limit_bytes: 1024,
            http_timeout_seconds: 30,
        };
        let printed = format!("{config:?}");
        assert!(printed.contains("<set>"));
        assert!(!printed.contains("c2VjcmV0"));
    }
}
