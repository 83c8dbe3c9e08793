use std::time::Duration;

use anyhow::{bail, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbBackend {
    Postgres,
    MySql,
}

/// Where the pool connects. The parts form is handed to the driver field by
/// field, so credentials never go through URL encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    Url(String),
    MariaDbParts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: DbTarget,
    pub backend: DbBackend,
    pub pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (target, backend) = match lookup("DATABASE_URL") {
            Some(url) => {
                let backend = backend_for_url(&url)?;
                (DbTarget::Url(url), backend)
            }
            None => (mariadb_parts(&lookup)?, DbBackend::MySql),
        };
        let database = DatabaseConfig {
            target,
            backend,
            pool_size: parse_or(&lookup, "DB_POOL_SIZE", 5)?,
        };

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", 60)?,
        };

        let gemini = GeminiConfig {
            api_key: lookup("GEMINI_API_KEY").filter(|k| !k.is_empty()),
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| "models/gemini-flash-latest".into()),
            base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".into()),
            timeout_secs: parse_or(&lookup, "GEMINI_TIMEOUT_SECS", 30)?,
        };

        let port = match lookup("PORT") {
            Some(_) => parse_or(&lookup, "PORT", 3000)?,
            None => parse_or(&lookup, "APP_PORT", 3000)?,
        };
        let server = ServerConfig {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "public".into()),
            body_limit_bytes: parse_or(&lookup, "BODY_LIMIT_BYTES", 10 * 1024 * 1024)?,
        };

        Ok(Self {
            database,
            jwt,
            gemini,
            server,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

fn mariadb_parts<F>(lookup: &F) -> anyhow::Result<DbTarget>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(DbTarget::MariaDbParts {
        host: lookup("DB_HOST").context("DATABASE_URL or DB_HOST must be set")?,
        port: parse_or(lookup, "DB_PORT", 3306)?,
        user: lookup("DB_USER").context("DB_USER must be set")?,
        password: lookup("DB_PASSWORD").unwrap_or_default(),
        database: lookup("DB_NAME").context("DB_NAME must be set")?,
    })
}

pub fn backend_for_url(url: &str) -> anyhow::Result<DbBackend> {
    let scheme = url.split_once("://").map(|(s, _)| s).unwrap_or_default();
    match scheme {
        "postgres" | "postgresql" => Ok(DbBackend::Postgres),
        "mysql" | "mariadb" => Ok(DbBackend::MySql),
        other => bail!("unsupported database scheme {other:?} in DATABASE_URL"),
    }
}
