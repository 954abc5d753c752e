/*
 * Responsibility
 * - 環境変数の読み込み (PORT, CORS 許可, Auth 設定, 管理 API の base path など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::AuthSettings;
use crate::services::auth::rules::VerificationKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
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

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    /// Where the management API is mounted, e.g. `/api/v1/data`.
    pub management_base_path: String,

    pub http_request_timeout: Duration,
    pub http_body_limit_bytes: usize,

    pub auth: AuthSettings,
}

fn parsed_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

fn non_empty(key: &'static str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parsed_or("PORT", 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let management_base_path = normalize_base_path(
            &std::env::var("MANAGEMENT_API_BASE_PATH")
                .unwrap_or_else(|_| "/api/v1/data".to_string()),
        )
        .ok_or(ConfigError::Invalid("MANAGEMENT_API_BASE_PATH"))?;

        let http_request_timeout =
            Duration::from_secs(parsed_or("HTTP_REQUEST_TIMEOUT_SECONDS", 30)?);
        let http_body_limit_bytes = parsed_or("HTTP_BODY_LIMIT_BYTES", 1024 * 1024)?;

        let issuer = non_empty("AUTH_ISSUER").ok_or(ConfigError::Missing("AUTH_ISSUER"))?;
        let audience = non_empty("AUTH_AUDIENCE");

        // Exactly one kind of key material.
        let key = match (
            non_empty("ACCESS_JWT_PUBLIC_KEY_PEM"),
            non_empty("ACCESS_JWT_HMAC_SECRET"),
        ) {
            (Some(pem), None) => VerificationKey::Ed25519Pem(pem.replace("\\n", "\n")),
            (None, Some(secret)) => VerificationKey::HmacSecret(secret),
            (Some(_), Some(_)) => return Err(ConfigError::Invalid("ACCESS_JWT_HMAC_SECRET")),
            (None, None) => return Err(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM")),
        };

        let leeway = leeway_from_secs(parsed_or("ACCESS_TOKEN_LEEWAY_SECONDS", 60)?)
            .ok_or(ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"))?;
        let rule_timeout = Duration::from_millis(parsed_or("VALIDATION_RULE_TIMEOUT_MS", 5000)?);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            management_base_path,
            http_request_timeout,
            http_body_limit_bytes,
            auth: AuthSettings {
                issuer,
                audience,
                key,
                leeway,
                rule_timeout,
            },
        })
    }
}

/// Seconds beyond what `chrono::Duration` can hold are rejected.
fn leeway_from_secs(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
}

/// `/api/v1/data/` -> `/api/v1/data`. The root path cannot be nested.
fn normalize_base_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return None;
    }
    Some(trimmed.to_string())
}
