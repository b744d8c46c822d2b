use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Where users and tasks are persisted.
#[derive(Debug, Clone, Deserialize)]
pub enum StorageBackend {
    Postgres(DatabaseConfig),
    /// In-process maps; data is lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    /// Scheme used when the link base is derived from the Host header.
    pub scheme: String,
    /// Fixed `scheme://host` prefix for reset links, overrides the Host header.
    pub link_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub jwt: JwtConfig,
    pub server: ServerConfig,
    pub reset: ResetConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = match env_or("STORAGE_BACKEND", "postgres").as_str() {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres(DatabaseConfig {
                url: std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?,
                max_connections: env_parse("DB_MAX_CONNECTIONS", 10)?,
                acquire_timeout_secs: env_parse("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
            }),
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
        };

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: env_or("JWT_ISSUER", "taskpad"),
            audience: env_or("JWT_AUDIENCE", "taskpad-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60)?,
        };

        let server = ServerConfig {
            host: env_or("APP_HOST", "0.0.0.0"),
            port: env_parse("APP_PORT", 8080)?,
        };

        let production = env_or("APP_ENV", "development") == "production";
        let reset = ResetConfig {
            scheme: if production { "https" } else { "http" }.into(),
            link_base: std::env::var("RESET_LINK_BASE")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
        };

        Ok(Self {
            storage,
            jwt,
            server,
            reset,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Unset falls back to `default`; a value that is set but does not parse is
/// a startup error.
fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_setting(key, std::env::var(key).ok(), default)
}

fn parse_setting<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value {v:?} for {key}")),
    }
}
